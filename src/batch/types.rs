use serde::{Deserialize, Serialize};

use super::models::{BatchModel, BatchStatus};

/// Request payload for creating a batch
#[derive(Debug, Default, Deserialize)]
pub struct BatchCreateRequest {
    /// Defaults to now
    pub created_at: Option<String>,
    /// Defaults to `created`
    pub status: Option<BatchStatus>,
}

#[derive(Debug, Deserialize)]
pub struct BatchStatusRequest {
    pub status: BatchStatus,
}

/// Response for batch information
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub id: String,
    pub status: BatchStatus,
    pub created_at: String,
    pub game_count: usize,
    pub game_ids: Vec<String>,
}

impl From<BatchModel> for BatchResponse {
    fn from(batch: BatchModel) -> Self {
        Self {
            id: batch.id,
            status: batch.status,
            created_at: batch.created_at,
            game_count: batch.game_ids.len(),
            game_ids: batch.game_ids,
        }
    }
}
