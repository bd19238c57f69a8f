use jellybeans::{
    app,
    batch::repository::InMemoryBatchRepository,
    game::repository::InMemoryGameRepository,
    player::repository::InMemoryPlayerRepository,
    AppState, EventBus, ExperimentConfig,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jellybeans=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExperimentConfig::from_env();
    info!(?config, "Starting jelly beans experiment server");

    let app_state = AppState::new(
        Arc::new(InMemoryPlayerRepository::new()),
        Arc::new(InMemoryBatchRepository::new()),
        Arc::new(InMemoryGameRepository::new()),
        EventBus::new(config.event_bus_capacity),
        config.clone(),
    );

    // Experiment callbacks react to everything published on the bus
    let _dispatcher = Arc::new(app::dispatcher(&app_state)).start_listening();

    let router = app::router(app_state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, error = %e, "Failed to bind");
            return;
        }
    };
    info!("Server running on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "Server error");
    }
}
