use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{
    lifecycle,
    models::{GameModel, GameStatus, StagePointer},
};
use crate::shared::AppError;

/// Trait for game repository operations
#[async_trait]
pub trait GameRepository {
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError>;
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError>;
    async fn list_games(&self) -> Result<Vec<GameModel>, AppError>;

    /// Adds the rounds and enters the first stage of a game that has not started
    ///
    /// Only rounds, status and the stage pointer are written.
    async fn start_game(&self, game_id: &str) -> Result<GameModel, AppError>;

    /// Moves a running game from `from` to the stage after it, ending the
    /// game when none is left. Conflicts if the game is no longer at `from`.
    async fn advance_from(
        &self,
        game_id: &str,
        from: StagePointer,
    ) -> Result<Option<StagePointer>, AppError>;

    /// Sets the `initialized` flag; returns false if it was already set
    async fn try_mark_initialized(&self, game_id: &str) -> Result<bool, AppError>;

    /// Adds a player to the game; returns false if they were already in it
    async fn add_player(&self, game_id: &str, player_id: &str) -> Result<bool, AppError>;
}

/// In-memory implementation of GameRepository for development and testing
pub struct InMemoryGameRepository {
    games: RwLock<HashMap<String, GameModel>>,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }
}

fn game_not_found(game_id: &str) -> AppError {
    AppError::NotFound(format!("Game {} not found", game_id))
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self, game))]
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError> {
        debug!(game_id = %game.id, group_code = %game.group_code, "Creating game in memory");

        let mut games = self.games.write().await;
        if games.contains_key(&game.id) {
            warn!(game_id = %game.id, "Game already exists in memory");
            return Err(AppError::Conflict("Game already exists".to_string()));
        }
        games.insert(game.id.clone(), game.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        Ok(self.games.read().await.get(game_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<GameModel>, AppError> {
        Ok(self.games.read().await.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn start_game(&self, game_id: &str) -> Result<GameModel, AppError> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| game_not_found(game_id))?;

        if game.status != GameStatus::Created {
            return Err(AppError::Conflict(format!(
                "Game {} cannot start from status {}",
                game_id, game.status
            )));
        }

        lifecycle::on_game_start(game);
        game.current = game.first_stage();
        game.status = if game.current.is_some() {
            GameStatus::Running
        } else {
            GameStatus::Ended
        };
        Ok(game.clone())
    }

    #[instrument(skip(self))]
    async fn advance_from(
        &self,
        game_id: &str,
        from: StagePointer,
    ) -> Result<Option<StagePointer>, AppError> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| game_not_found(game_id))?;

        if game.status != GameStatus::Running || game.current != Some(from) {
            debug!(
                game_id = %game_id,
                expected = ?from,
                current = ?game.current,
                "Game is no longer at the expected stage"
            );
            return Err(AppError::Conflict(format!(
                "Game {} is no longer at round {} stage {}",
                game_id, from.round_index, from.stage_index
            )));
        }

        let next = game.stage_after(Some(from));
        game.current = next;
        if next.is_none() {
            game.status = GameStatus::Ended;
        }
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn try_mark_initialized(&self, game_id: &str) -> Result<bool, AppError> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| game_not_found(game_id))?;

        if game.initialized {
            debug!(game_id = %game_id, "Game already initialized");
            return Ok(false);
        }
        game.initialized = true;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn add_player(&self, game_id: &str, player_id: &str) -> Result<bool, AppError> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| game_not_found(game_id))?;

        let added = game.add_player(player_id);
        if added {
            info!(
                game_id = %game_id,
                player_id = %player_id,
                player_count = game.player_ids.len(),
                "Player added to game"
            );
        }
        Ok(added)
    }
}
