use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    batch,
    event::EventDispatcher,
    game::{self, LifecycleHandler},
    matching::{GameInitializeHandler, GroupCodeMatchHandler, MatchingService},
    player,
    scoring::{JellyBeanScorer, ScoringHandler, ScoringService},
    shared::AppState,
};

/// HTTP routes for participants and experiment admins
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "jelly beans experiment" }))
        // Participant
        .route("/players", post(player::create_player))
        .route("/players/:id", get(player::get_player))
        .route("/players/:id/group-code", post(player::submit_group_code))
        .route("/players/:id/guess", post(player::submit_guess))
        // Admin
        .route(
            "/batches",
            post(batch::create_batch).get(batch::list_batches),
        )
        .route("/batches/:id/status", post(batch::set_batch_status))
        .route("/games", get(game::list_games))
        .route("/games/:id", get(game::get_game))
        .route("/games/:id/advance", post(game::advance_stage))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the dispatcher with every experiment callback registered
///
/// Order matters for a single event: matching and game setup run before
/// scoring and the no-op lifecycle hooks.
pub fn dispatcher(state: &AppState) -> EventDispatcher {
    let matching = Arc::new(MatchingService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.batch_repository),
        Arc::clone(&state.game_repository),
        state.config.default_player_count,
    ));
    let scoring = Arc::new(ScoringService::new(
        Arc::clone(&state.game_repository),
        Arc::clone(&state.player_repository),
        JellyBeanScorer::new(state.config.jelly_beans_reference_count),
    ));

    let mut dispatcher = EventDispatcher::new(state.event_bus.clone())
        .with_handler_timeout(state.config.handler_timeout)
        .with_max_retries(state.config.handler_max_retries)
        .with_dedup_window(state.config.event_dedup_window);

    dispatcher.add_handler(Arc::new(GroupCodeMatchHandler::new(Arc::clone(&matching))));
    dispatcher.add_handler(Arc::new(GameInitializeHandler::new(matching)));
    dispatcher.add_handler(Arc::new(ScoringHandler::new(scoring)));
    dispatcher.add_handler(Arc::new(LifecycleHandler));
    dispatcher
}
