use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{BatchModel, BatchStatus},
    repository::BatchRepository,
};
use crate::shared::AppError;

/// Batches players can currently join, in the order given
pub fn open_batches(batches: &[BatchModel]) -> Vec<BatchModel> {
    batches.iter().filter(|b| b.is_open()).cloned().collect()
}

/// Picks the batch with the earliest `created_at`
///
/// Single pass. On equal timestamps the first one seen wins. A batch whose
/// timestamp does not parse is logged and skipped, so it is never returned.
/// Returns `None` for an empty slice or when no timestamp parses.
pub fn select_oldest_batch(batches: &[BatchModel]) -> Option<&BatchModel> {
    let mut oldest: Option<(&BatchModel, DateTime<Utc>)> = None;

    for batch in batches {
        let Some(created_at) = batch.created_at_utc() else {
            warn!(
                batch_id = %batch.id,
                created_at = %batch.created_at,
                "Failed to parse createdAt timestamp for batch"
            );
            continue;
        };

        match oldest {
            Some((_, current)) if current <= created_at => {}
            _ => oldest = Some((batch, created_at)),
        }
    }

    oldest.map(|(batch, _)| batch)
}

/// Service for batch administration and lookup
pub struct BatchService {
    repository: Arc<dyn BatchRepository + Send + Sync>,
}

impl BatchService {
    pub fn new(repository: Arc<dyn BatchRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Creates a batch, optionally with an explicit creation timestamp
    #[instrument(skip(self))]
    pub async fn create_batch(
        &self,
        created_at: Option<String>,
        status: Option<BatchStatus>,
    ) -> Result<BatchModel, AppError> {
        let mut batch = match created_at {
            Some(raw) => BatchModel::with_created_at(raw),
            None => BatchModel::new(),
        };
        if let Some(status) = status {
            batch.status = status;
        }

        self.repository.create_batch(&batch).await?;

        info!(batch_id = %batch.id, status = %batch.status, "Batch created");
        Ok(batch)
    }

    pub async fn list_batches(&self) -> Result<Vec<BatchModel>, AppError> {
        self.repository.list_batches().await
    }

    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        batch_id: &str,
        status: BatchStatus,
    ) -> Result<BatchModel, AppError> {
        self.repository.update_status(batch_id, status).await
    }

    /// Every batch with status `running`
    pub async fn open_batches(&self) -> Result<Vec<BatchModel>, AppError> {
        let batches = self.repository.list_batches().await?;
        Ok(open_batches(&batches))
    }

    /// The oldest running batch, if there is one
    #[instrument(skip(self))]
    pub async fn oldest_open_batch(&self) -> Result<Option<BatchModel>, AppError> {
        let open = self.open_batches().await?;
        let oldest = select_oldest_batch(&open).cloned();

        debug!(
            open_count = open.len(),
            selected = oldest.as_ref().map(|b| b.id.as_str()).unwrap_or("none"),
            "Selected oldest open batch"
        );
        Ok(oldest)
    }
}
