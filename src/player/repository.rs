use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{OnboardingStep, PlayerModel};
use crate::shared::AppError;

/// Trait for player repository operations
///
/// Mutations that guard once-only behavior are atomic test-and-set
/// operations so two deliveries of the same change cannot both pass.
#[async_trait]
pub trait PlayerRepository {
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError>;
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError>;

    /// Stores the submitted group code verbatim and moves the player to the lobby
    async fn submit_group_code(
        &self,
        player_id: &str,
        group_code: &str,
    ) -> Result<PlayerModel, AppError>;

    /// Sets the `initialized` flag; returns false if it was already set
    async fn try_mark_initialized(&self, player_id: &str) -> Result<bool, AppError>;

    /// Records the batch id unless one is already recorded; returns whether it was written
    async fn assign_batch(&self, player_id: &str, batch_id: &str) -> Result<bool, AppError>;

    async fn set_game(&self, player_id: &str, game_id: &str) -> Result<(), AppError>;

    async fn record_guess(&self, player_id: &str, round_id: &str, guess: f64)
        -> Result<(), AppError>;

    /// Writes the round score and adds it to the running total
    async fn record_round_score(
        &self,
        player_id: &str,
        round_id: &str,
        round_score: u32,
    ) -> Result<PlayerModel, AppError>;
}

/// In-memory implementation of PlayerRepository for development and testing
pub struct InMemoryPlayerRepository {
    players: RwLock<HashMap<String, PlayerModel>>,
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
        }
    }
}

fn player_not_found(player_id: &str) -> AppError {
    AppError::NotFound(format!("Player {} not found", player_id))
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        debug!(player_id = %player.id, "Creating player in memory");

        let mut players = self.players.write().await;
        if players.contains_key(&player.id) {
            warn!(player_id = %player.id, "Player already exists in memory");
            return Err(AppError::Conflict("Player already exists".to_string()));
        }
        players.insert(player.id.clone(), player.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError> {
        Ok(self.players.read().await.get(player_id).cloned())
    }

    #[instrument(skip(self))]
    async fn submit_group_code(
        &self,
        player_id: &str,
        group_code: &str,
    ) -> Result<PlayerModel, AppError> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| player_not_found(player_id))?;

        player.group_code = Some(group_code.to_string());
        player.onboarding = OnboardingStep::Lobby;

        debug!(player_id = %player_id, group_code = %group_code, "Group code stored");
        Ok(player.clone())
    }

    #[instrument(skip(self))]
    async fn try_mark_initialized(&self, player_id: &str) -> Result<bool, AppError> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| player_not_found(player_id))?;

        if player.initialized {
            debug!(player_id = %player_id, "Player already initialized");
            return Ok(false);
        }
        player.initialized = true;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn assign_batch(&self, player_id: &str, batch_id: &str) -> Result<bool, AppError> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| player_not_found(player_id))?;

        if let Some(existing) = &player.batch_id {
            warn!(
                player_id = %player_id,
                existing_batch = %existing,
                requested_batch = %batch_id,
                "Player already has a batch, keeping it"
            );
            return Ok(false);
        }
        player.batch_id = Some(batch_id.to_string());

        info!(player_id = %player_id, batch_id = %batch_id, "Player assigned to batch");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn set_game(&self, player_id: &str, game_id: &str) -> Result<(), AppError> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| player_not_found(player_id))?;
        player.game_id = Some(game_id.to_string());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_guess(
        &self,
        player_id: &str,
        round_id: &str,
        guess: f64,
    ) -> Result<(), AppError> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| player_not_found(player_id))?;
        player.rounds.entry(round_id.to_string()).or_default().guess = Some(guess);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_round_score(
        &self,
        player_id: &str,
        round_id: &str,
        round_score: u32,
    ) -> Result<PlayerModel, AppError> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| player_not_found(player_id))?;
        if !player.record_round_score(round_id, round_score) {
            debug!(player_id = %player_id, round_id = %round_id, "Round already scored");
        }
        Ok(player.clone())
    }
}
