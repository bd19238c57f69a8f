use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{BatchModel, BatchStatus};
use crate::shared::AppError;

/// Trait for batch repository operations
#[async_trait]
pub trait BatchRepository {
    async fn create_batch(&self, batch: &BatchModel) -> Result<(), AppError>;
    async fn get_batch(&self, batch_id: &str) -> Result<Option<BatchModel>, AppError>;

    /// All batches in insertion order
    async fn list_batches(&self) -> Result<Vec<BatchModel>, AppError>;

    async fn update_status(
        &self,
        batch_id: &str,
        status: BatchStatus,
    ) -> Result<BatchModel, AppError>;

    /// Appends a game to the batch's game list
    async fn add_game(&self, batch_id: &str, game_id: &str) -> Result<(), AppError>;
}

#[derive(Default)]
struct BatchStore {
    batches: HashMap<String, BatchModel>,
    order: Vec<String>,
}

/// In-memory implementation of BatchRepository for development and testing
pub struct InMemoryBatchRepository {
    store: RwLock<BatchStore>,
}

impl Default for InMemoryBatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(BatchStore::default()),
        }
    }
}

fn batch_not_found(batch_id: &str) -> AppError {
    AppError::NotFound(format!("Batch {} not found", batch_id))
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    #[instrument(skip(self, batch))]
    async fn create_batch(&self, batch: &BatchModel) -> Result<(), AppError> {
        debug!(batch_id = %batch.id, created_at = %batch.created_at, "Creating batch in memory");

        let mut store = self.store.write().await;
        if store.batches.contains_key(&batch.id) {
            warn!(batch_id = %batch.id, "Batch already exists in memory");
            return Err(AppError::Conflict("Batch already exists".to_string()));
        }
        store.order.push(batch.id.clone());
        store.batches.insert(batch.id.clone(), batch.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_batch(&self, batch_id: &str) -> Result<Option<BatchModel>, AppError> {
        Ok(self.store.read().await.batches.get(batch_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_batches(&self) -> Result<Vec<BatchModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .order
            .iter()
            .filter_map(|id| store.batches.get(id).cloned())
            .collect())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        batch_id: &str,
        status: BatchStatus,
    ) -> Result<BatchModel, AppError> {
        let mut store = self.store.write().await;
        let batch = store
            .batches
            .get_mut(batch_id)
            .ok_or_else(|| batch_not_found(batch_id))?;

        let previous = batch.status;
        batch.status = status;

        info!(batch_id = %batch_id, from = %previous, to = %status, "Batch status changed");
        Ok(batch.clone())
    }

    #[instrument(skip(self))]
    async fn add_game(&self, batch_id: &str, game_id: &str) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        let batch = store
            .batches
            .get_mut(batch_id)
            .ok_or_else(|| batch_not_found(batch_id))?;

        batch.game_ids.push(game_id.to_string());
        debug!(batch_id = %batch_id, game_id = %game_id, game_count = batch.game_ids.len(), "Game added to batch");
        Ok(())
    }
}
