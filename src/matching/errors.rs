use thiserror::Error;

use crate::shared::AppError;

/// Reasons a matching step could not proceed
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Player {player_id} submitted an empty group code")]
    MissingGroupCode { player_id: String },

    #[error("No open batch available for player {player_id}")]
    NoOpenBatch { player_id: String },

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] AppError),
}

impl MatchError {
    /// Expected outcomes of matching that only warrant a log line
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            MatchError::MissingGroupCode { .. } | MatchError::NoOpenBatch { .. }
        )
    }
}
