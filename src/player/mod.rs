// Public API - what other modules can use
pub use handlers::{create_player, get_player, submit_group_code, submit_guess};
pub use models::{OnboardingStep, PlayerModel, PlayerRound};
pub use service::PlayerService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
