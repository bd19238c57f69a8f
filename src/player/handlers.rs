use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::PlayerService,
    types::{GroupCodeRequest, GuessRequest, GuessResponse, OnboardingResponse, PlayerResponse},
};
use crate::shared::{AppError, AppState};

fn player_service(state: &AppState) -> PlayerService {
    PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.game_repository),
        state.event_bus.clone(),
    )
}

/// HTTP handler for registering a participant
///
/// POST /players
#[instrument(name = "create_player", skip(state))]
pub async fn create_player(State(state): State<AppState>) -> Result<Json<PlayerResponse>, AppError> {
    let player = player_service(&state).create_player().await?;
    Ok(Json(player.into()))
}

/// GET /players/:id
#[instrument(name = "get_player", skip(state))]
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerResponse>, AppError> {
    let player = player_service(&state).get_player(&player_id).await?;
    Ok(Json(player.into()))
}

/// HTTP handler behind the onboarding form
///
/// POST /players/:id/group-code
/// Stores the code and tells the client which step comes next
#[instrument(name = "submit_group_code", skip(state, request))]
pub async fn submit_group_code(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<GroupCodeRequest>,
) -> Result<Json<OnboardingResponse>, AppError> {
    info!(player_id = %player_id, "Group code form submitted");

    let response = player_service(&state)
        .submit_group_code(&player_id, &request.group_code)
        .await?;

    Ok(Json(response))
}

/// POST /players/:id/guess
#[instrument(name = "submit_guess", skip(state, request))]
pub async fn submit_guess(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, AppError> {
    let response = player_service(&state)
        .submit_guess(&player_id, request.guess)
        .await?;
    Ok(Json(response))
}
