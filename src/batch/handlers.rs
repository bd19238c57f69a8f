use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::BatchService,
    types::{BatchCreateRequest, BatchResponse, BatchStatusRequest},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new batch
///
/// POST /batches
#[instrument(name = "create_batch", skip(state))]
pub async fn create_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchCreateRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let service = BatchService::new(Arc::clone(&state.batch_repository));
    let batch = service
        .create_batch(request.created_at, request.status)
        .await?;

    Ok(Json(batch.into()))
}

/// HTTP handler for listing all batches
///
/// GET /batches
#[instrument(name = "list_batches", skip(state))]
pub async fn list_batches(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchResponse>>, AppError> {
    let service = BatchService::new(Arc::clone(&state.batch_repository));
    let batches = service.list_batches().await?;

    info!(batch_count = batches.len(), "Batches listed");
    Ok(Json(batches.into_iter().map(BatchResponse::from).collect()))
}

/// HTTP handler for opening or closing a batch
///
/// POST /batches/:id/status
#[instrument(name = "set_batch_status", skip(state))]
pub async fn set_batch_status(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
    Json(request): Json<BatchStatusRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let service = BatchService::new(Arc::clone(&state.batch_repository));
    let batch = service.set_status(&batch_id, request.status).await?;

    Ok(Json(batch.into()))
}
