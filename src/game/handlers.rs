use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{service::GameService, types::GameResponse};
use crate::shared::{AppError, AppState};

fn game_service(state: &AppState) -> GameService {
    GameService::new(
        Arc::clone(&state.game_repository),
        Arc::clone(&state.player_repository),
    )
}

/// HTTP handler for fetching a game
///
/// GET /games/:id
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service(&state).get_game(&game_id).await?;
    Ok(Json(game.into()))
}

/// GET /games
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let games = game_service(&state).list_games().await?;
    Ok(Json(games.into_iter().map(GameResponse::from).collect()))
}

/// HTTP handler for ending the current stage of a game
///
/// POST /games/:id/advance
/// Stands in for the stage timer: the produced lifecycle events go on the bus.
#[instrument(name = "advance_stage", skip(state))]
pub async fn advance_stage(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let service = game_service(&state);
    let events = service.advance_stage(&game_id).await?;

    info!(game_id = %game_id, event_count = events.len(), "Stage advanced by admin");
    for event in events {
        state.event_bus.emit(event);
    }

    let game = service.get_game(&game_id).await?;
    Ok(Json(game.into()))
}
