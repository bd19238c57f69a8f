use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{GameModel, GameStatus},
    repository::GameRepository,
};
use crate::{
    event::{EventKind, ExperimentEvent},
    player::repository::PlayerRepository,
    shared::AppError,
};

/// Service for the game state machine: players, start, and stage progression
///
/// Mutating operations return the events they produced instead of emitting
/// them, so callers decide whether they go on the bus or back to the
/// dispatcher.
pub struct GameService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
}

impl GameService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    ) -> Self {
        Self {
            game_repository,
            player_repository,
        }
    }

    pub async fn get_game(&self, game_id: &str) -> Result<GameModel, AppError> {
        self.game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))
    }

    pub async fn list_games(&self) -> Result<Vec<GameModel>, AppError> {
        self.game_repository.list_games().await
    }

    /// Puts a player into a game and records the game on the player
    #[instrument(skip(self))]
    pub async fn assign_player(
        &self,
        game_id: &str,
        player_id: &str,
    ) -> Result<Vec<ExperimentEvent>, AppError> {
        if self.player_repository.get_player(player_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Player {} not found", player_id)));
        }

        if !self.game_repository.add_player(game_id, player_id).await? {
            debug!(game_id = %game_id, player_id = %player_id, "Player already in game");
            return Ok(vec![]);
        }
        self.player_repository.set_game(player_id, game_id).await?;

        info!(game_id = %game_id, player_id = %player_id, "Player assigned to game");
        Ok(vec![ExperimentEvent::new(EventKind::PlayerAssigned {
            game_id: game_id.to_string(),
            player_id: player_id.to_string(),
        })])
    }

    /// Starts a created game: adds its rounds and enters the first stage
    #[instrument(skip(self))]
    pub async fn start_game(&self, game_id: &str) -> Result<Vec<ExperimentEvent>, AppError> {
        let game = self.game_repository.start_game(game_id).await?;

        let mut events = vec![ExperimentEvent::new(EventKind::GameStarted {
            game_id: game.id.clone(),
        })];

        match game.current {
            Some(pointer) => {
                events.push(ExperimentEvent::new(EventKind::RoundStarted {
                    game_id: game.id.clone(),
                    round_index: pointer.round_index,
                }));
                events.push(ExperimentEvent::new(EventKind::StageStarted {
                    game_id: game.id.clone(),
                    round_index: pointer.round_index,
                    stage_index: pointer.stage_index,
                }));
            }
            None => {
                warn!(game_id = %game.id, "Game has no stages, ending immediately");
                events.push(ExperimentEvent::new(EventKind::GameEnded {
                    game_id: game.id.clone(),
                }));
            }
        }

        info!(
            game_id = %game.id,
            player_count = game.player_ids.len(),
            "Game started"
        );
        Ok(events)
    }

    /// Ends the current stage and moves to the next one, ending rounds and the
    /// game as they run out
    ///
    /// The move only happens if the game is still at the stage read here, so
    /// overlapping calls end each stage once.
    #[instrument(skip(self))]
    pub async fn advance_stage(&self, game_id: &str) -> Result<Vec<ExperimentEvent>, AppError> {
        let game = self.get_game(game_id).await?;
        let current = match (game.status, game.current) {
            (GameStatus::Running, Some(pointer)) => pointer,
            _ => {
                return Err(AppError::Conflict(format!(
                    "Game {} is not running",
                    game_id
                )))
            }
        };

        let next = self.game_repository.advance_from(game_id, current).await?;

        let mut events = vec![ExperimentEvent::new(EventKind::StageEnded {
            game_id: game.id.clone(),
            round_index: current.round_index,
            stage_index: current.stage_index,
        })];

        let round_finished = next.map_or(true, |p| p.round_index != current.round_index);
        if round_finished {
            events.push(ExperimentEvent::new(EventKind::RoundEnded {
                game_id: game.id.clone(),
                round_index: current.round_index,
            }));
        }

        match next {
            Some(pointer) => {
                if round_finished {
                    events.push(ExperimentEvent::new(EventKind::RoundStarted {
                        game_id: game.id.clone(),
                        round_index: pointer.round_index,
                    }));
                }
                events.push(ExperimentEvent::new(EventKind::StageStarted {
                    game_id: game.id.clone(),
                    round_index: pointer.round_index,
                    stage_index: pointer.stage_index,
                }));
            }
            None => {
                events.push(ExperimentEvent::new(EventKind::GameEnded {
                    game_id: game.id.clone(),
                }));
            }
        }

        debug!(
            game_id = %game.id,
            event_count = events.len(),
            game_ended = next.is_none(),
            "Stage advanced"
        );
        Ok(events)
    }
}
