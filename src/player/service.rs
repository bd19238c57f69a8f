use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::PlayerModel,
    repository::PlayerRepository,
    types::{GuessResponse, OnboardingResponse},
};
use crate::{
    event::{EventBus, EventKind, ExperimentEvent},
    game::repository::GameRepository,
    shared::AppError,
};

/// Service for participant-facing operations
pub struct PlayerService {
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    event_bus: EventBus,
}

impl PlayerService {
    pub fn new(
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            player_repository,
            game_repository,
            event_bus,
        }
    }

    /// Registers a newly connected participant
    #[instrument(skip(self))]
    pub async fn create_player(&self) -> Result<PlayerModel, AppError> {
        let player = PlayerModel::new();
        self.player_repository.create_player(&player).await?;

        info!(player_id = %player.id, "Player created");
        Ok(player)
    }

    pub async fn get_player(&self, player_id: &str) -> Result<PlayerModel, AppError> {
        self.player_repository
            .get_player(player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Player {} not found", player_id)))
    }

    /// Stores the group code from the onboarding form and publishes the change
    ///
    /// No validation: an empty code is written as-is. Matching ignores empty
    /// codes when it sees the change.
    #[instrument(skip(self))]
    pub async fn submit_group_code(
        &self,
        player_id: &str,
        group_code: &str,
    ) -> Result<OnboardingResponse, AppError> {
        let player = self
            .player_repository
            .submit_group_code(player_id, group_code)
            .await?;

        self.event_bus
            .emit(ExperimentEvent::new(EventKind::GroupCodeChanged {
                player_id: player.id.clone(),
                group_code: group_code.to_string(),
            }));

        info!(player_id = %player.id, group_code = %group_code, "Group code submitted");

        Ok(OnboardingResponse {
            player_id: player.id,
            group_code: group_code.to_string(),
            next_step: player.onboarding,
        })
    }

    /// Records a guess for the round the player's game is currently in
    #[instrument(skip(self))]
    pub async fn submit_guess(
        &self,
        player_id: &str,
        guess: f64,
    ) -> Result<GuessResponse, AppError> {
        if !guess.is_finite() {
            return Err(AppError::BadRequest("Guess must be a finite number".to_string()));
        }

        let player = self.get_player(player_id).await?;
        let game_id = player
            .game_id
            .ok_or_else(|| AppError::Conflict(format!("Player {} is not in a game", player_id)))?;

        let game = self
            .game_repository
            .get_game(&game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;

        let round = game
            .current_round()
            .ok_or_else(|| AppError::Conflict(format!("Game {} has no active round", game_id)))?;

        self.player_repository
            .record_guess(player_id, &round.id, guess)
            .await?;

        debug!(player_id = %player_id, round_id = %round.id, guess, "Guess recorded");

        Ok(GuessResponse {
            player_id: player_id.to_string(),
            round_id: round.id.clone(),
            guess,
        })
    }
}
