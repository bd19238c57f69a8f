use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::batch::repository::BatchRepository;
use crate::config::ExperimentConfig;
use crate::event::EventBus;
use crate::game::repository::GameRepository;
use crate::player::repository::PlayerRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    pub batch_repository: Arc<dyn BatchRepository + Send + Sync>,
    pub game_repository: Arc<dyn GameRepository + Send + Sync>,
    pub event_bus: EventBus,
    pub config: ExperimentConfig,
}

impl AppState {
    pub fn new(
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        batch_repository: Arc<dyn BatchRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        event_bus: EventBus,
        config: ExperimentConfig,
    ) -> Self {
        Self {
            player_repository,
            batch_repository,
            game_repository,
            event_bus,
            config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
