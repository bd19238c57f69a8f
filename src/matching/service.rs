use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::errors::MatchError;
use crate::{
    batch::{repository::BatchRepository, BatchService},
    event::{EventKind, ExperimentEvent},
    game::{repository::GameRepository, GameModel, GameService, Treatment},
    player::repository::PlayerRepository,
    shared::AppError,
};

/// Result of matching a player by group code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Matching already ran for this player; nothing changed
    AlreadyInitialized,
    /// A game with the same group code existed and the player joined it
    JoinedExistingGame { batch_id: String, game_id: String },
    /// No game had the code, so one was created. The player joins once the
    /// new game is initialized.
    CreatedGame { batch_id: String, game_id: String },
}

/// Result of the one-time setup of a new game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameInitOutcome {
    AlreadyInitialized,
    Started {
        game_id: String,
        starting_player_id: String,
    },
}

/// An outcome together with the events its mutations produced
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub outcome: T,
    pub events: Vec<ExperimentEvent>,
}

impl<T> Applied<T> {
    fn quiet(outcome: T) -> Self {
        Self {
            outcome,
            events: Vec::new(),
        }
    }
}

/// Places players into games by group code within the oldest open batch
pub struct MatchingService {
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    batch_repository: Arc<dyn BatchRepository + Send + Sync>,
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    batch_service: BatchService,
    game_service: GameService,
    default_player_count: u32,
}

impl MatchingService {
    pub fn new(
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        batch_repository: Arc<dyn BatchRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        default_player_count: u32,
    ) -> Self {
        Self {
            batch_service: BatchService::new(Arc::clone(&batch_repository)),
            game_service: GameService::new(
                Arc::clone(&game_repository),
                Arc::clone(&player_repository),
            ),
            player_repository,
            batch_repository,
            game_repository,
            default_player_count,
        }
    }

    /// Matches a player who just submitted a group code
    ///
    /// Runs at most once per player. When no batch is open the player stays
    /// unassigned and nothing retries; the `initialized` flag stays set.
    #[instrument(skip(self))]
    pub async fn match_player(
        &self,
        player_id: &str,
        group_code: &str,
    ) -> Result<Applied<MatchOutcome>, MatchError> {
        if group_code.is_empty() {
            return Err(MatchError::MissingGroupCode {
                player_id: player_id.to_string(),
            });
        }

        let first_time = self
            .player_repository
            .try_mark_initialized(player_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => MatchError::PlayerNotFound(player_id.to_string()),
                other => MatchError::Repository(other),
            })?;
        if !first_time {
            debug!(player_id = %player_id, "Matching already ran for player, skipping");
            return Ok(Applied::quiet(MatchOutcome::AlreadyInitialized));
        }

        let batch = self
            .batch_service
            .oldest_open_batch()
            .await?
            .ok_or_else(|| MatchError::NoOpenBatch {
                player_id: player_id.to_string(),
            })?;

        self.player_repository
            .assign_batch(player_id, &batch.id)
            .await?;

        if let Some(game) = self.find_game(&batch.game_ids, group_code).await? {
            info!(
                player_id = %player_id,
                group_code = %group_code,
                game_id = %game.id,
                "Found game for group"
            );
            let events = self.game_service.assign_player(&game.id, player_id).await?;
            return Ok(Applied {
                outcome: MatchOutcome::JoinedExistingGame {
                    batch_id: batch.id,
                    game_id: game.id,
                },
                events,
            });
        }

        let game = GameModel::new(
            batch.id.clone(),
            group_code,
            player_id,
            Treatment {
                player_count: self.default_player_count,
            },
        );
        self.game_repository.create_game(&game).await?;
        self.batch_repository.add_game(&batch.id, &game.id).await?;

        info!(
            player_id = %player_id,
            group_code = %group_code,
            game_id = %game.id,
            batch_id = %batch.id,
            "Created game for group"
        );

        Ok(Applied {
            events: vec![ExperimentEvent::new(EventKind::GameCreated {
                game_id: game.id.clone(),
                batch_id: batch.id.clone(),
            })],
            outcome: MatchOutcome::CreatedGame {
                batch_id: batch.id,
                game_id: game.id,
            },
        })
    }

    /// One-time setup of a game: assigns the starting player and starts it
    #[instrument(skip(self))]
    pub async fn initialize_game(
        &self,
        game_id: &str,
    ) -> Result<Applied<GameInitOutcome>, MatchError> {
        let first_time = self
            .game_repository
            .try_mark_initialized(game_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => MatchError::GameNotFound(game_id.to_string()),
                other => MatchError::Repository(other),
            })?;
        if !first_time {
            return Ok(Applied::quiet(GameInitOutcome::AlreadyInitialized));
        }

        let game = self
            .game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| MatchError::GameNotFound(game_id.to_string()))?;

        let starting_player_id = game.starting_player_id.clone();
        if self
            .player_repository
            .get_player(&starting_player_id)
            .await?
            .is_none()
        {
            warn!(
                game_id = %game_id,
                starting_player_id = %starting_player_id,
                "Starting player does not exist, game left unstarted"
            );
            return Err(MatchError::PlayerNotFound(starting_player_id));
        }

        let mut events = self
            .game_service
            .assign_player(game_id, &starting_player_id)
            .await?;
        events.extend(self.game_service.start_game(game_id).await?);

        info!(
            game_id = %game_id,
            starting_player_id = %starting_player_id,
            "Game initialized"
        );

        Ok(Applied {
            outcome: GameInitOutcome::Started {
                game_id: game_id.to_string(),
                starting_player_id,
            },
            events,
        })
    }

    /// First game, in batch order, registered under the group code
    async fn find_game(
        &self,
        game_ids: &[String],
        group_code: &str,
    ) -> Result<Option<GameModel>, AppError> {
        for game_id in game_ids {
            match self.game_repository.get_game(game_id).await? {
                Some(game) if game.group_code == group_code => return Ok(Some(game)),
                Some(_) => {}
                None => warn!(game_id = %game_id, "Batch references a missing game"),
            }
        }
        Ok(None)
    }
}
