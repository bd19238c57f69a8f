use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{errors::MatchError, service::MatchingService};
use crate::event::{EventError, EventHandler, EventKind, ExperimentEvent};

/// Logs a matching failure and absorbs it
///
/// Matching failures never travel back to the bus: the participant simply
/// stays where they are.
fn absorb(handler: &'static str, error: MatchError) -> Result<Vec<ExperimentEvent>, EventError> {
    if error.is_expected() {
        info!(handler = handler, reason = %error, "Matching stopped");
    } else {
        error!(handler = handler, error = %error, "Matching failed");
    }
    Ok(vec![])
}

/// Runs matching when a player's group code changes
pub struct GroupCodeMatchHandler {
    matching: Arc<MatchingService>,
}

impl GroupCodeMatchHandler {
    pub fn new(matching: Arc<MatchingService>) -> Self {
        Self { matching }
    }
}

#[async_trait]
impl EventHandler for GroupCodeMatchHandler {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn handle(&self, event: &ExperimentEvent) -> Result<Vec<ExperimentEvent>, EventError> {
        let EventKind::GroupCodeChanged {
            player_id,
            group_code,
        } = &event.kind
        else {
            return Ok(vec![]);
        };

        match self.matching.match_player(player_id, group_code).await {
            Ok(applied) => {
                info!(
                    player_id = %player_id,
                    outcome = ?applied.outcome,
                    "Group code matched"
                );
                Ok(applied.events)
            }
            Err(e) => absorb(self.name(), e),
        }
    }

    fn name(&self) -> &'static str {
        "GroupCodeMatchHandler"
    }
}

/// Runs the one-time game setup when a game changes
///
/// Reacts to every game field change (creation, player assignment); the
/// game's `initialized` flag makes all but the first a no-op.
pub struct GameInitializeHandler {
    matching: Arc<MatchingService>,
}

impl GameInitializeHandler {
    pub fn new(matching: Arc<MatchingService>) -> Self {
        Self { matching }
    }
}

#[async_trait]
impl EventHandler for GameInitializeHandler {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn handle(&self, event: &ExperimentEvent) -> Result<Vec<ExperimentEvent>, EventError> {
        let game_id = match &event.kind {
            EventKind::GameCreated { game_id, .. } | EventKind::PlayerAssigned { game_id, .. } => {
                game_id
            }
            _ => return Ok(vec![]),
        };

        match self.matching.initialize_game(game_id).await {
            Ok(applied) => Ok(applied.events),
            Err(e) => absorb(self.name(), e),
        }
    }

    fn name(&self) -> &'static str {
        "GameInitializeHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{repository::BatchRepository, repository::InMemoryBatchRepository};
    use crate::batch::{BatchModel, BatchStatus};
    use crate::game::repository::InMemoryGameRepository;
    use crate::player::repository::{InMemoryPlayerRepository, PlayerRepository};
    use crate::player::PlayerModel;

    async fn matching_with_player(open_batch: bool) -> Arc<MatchingService> {
        let players = Arc::new(InMemoryPlayerRepository::new());
        players
            .create_player(&PlayerModel::with_id("p1"))
            .await
            .unwrap();

        let batches = Arc::new(InMemoryBatchRepository::new());
        if open_batch {
            let mut batch = BatchModel::new();
            batch.status = BatchStatus::Running;
            batches.create_batch(&batch).await.unwrap();
        }

        Arc::new(MatchingService::new(
            players,
            batches,
            Arc::new(InMemoryGameRepository::new()),
            2,
        ))
    }

    fn group_code_changed(code: &str) -> ExperimentEvent {
        ExperimentEvent::new(EventKind::GroupCodeChanged {
            player_id: "p1".to_string(),
            group_code: code.to_string(),
        })
    }

    #[tokio::test]
    async fn group_code_change_yields_game_created() {
        let handler = GroupCodeMatchHandler::new(matching_with_player(true).await);

        let events = handler.handle(&group_code_changed("red")).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "game_created");
    }

    #[tokio::test]
    async fn missing_batch_is_absorbed() {
        let handler = GroupCodeMatchHandler::new(matching_with_player(false).await);

        let events = handler.handle(&group_code_changed("red")).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn unrelated_events_are_ignored() {
        let matching = matching_with_player(true).await;
        let handler = GameInitializeHandler::new(matching);

        let events = handler.handle(&group_code_changed("red")).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn unknown_game_is_absorbed() {
        let handler = GameInitializeHandler::new(matching_with_player(true).await);

        let event = ExperimentEvent::new(EventKind::GameCreated {
            game_id: "missing".to_string(),
            batch_id: "b1".to_string(),
        });
        assert!(handler.handle(&event).await.unwrap().is_empty());
    }
}
