// Public API
pub use handlers::{advance_stage, get_game, list_games};
pub use lifecycle::LifecycleHandler;
pub use models::{GameModel, GameStatus, Round, Stage, StagePointer, Task, Treatment};
pub use service::GameService;

// Internal modules
mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repository;
mod service;
pub mod types;
