// Library crate for the jelly beans experiment server
// This file exposes the public API for integration tests

pub mod app;
pub mod batch;
pub mod config;
pub mod event;
pub mod game;
pub mod matching;
pub mod player;
pub mod scoring;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::ExperimentConfig;
pub use event::{EventBus, EventDispatcher, EventKind, ExperimentEvent};
pub use matching::{MatchOutcome, MatchingService};
pub use shared::{AppError, AppState};
