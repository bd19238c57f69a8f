// Public API - what other modules can use
pub use handlers::{create_batch, list_batches, set_batch_status};
pub use models::{parse_timestamp, BatchModel, BatchStatus};
pub use service::{open_batches, select_oldest_batch, BatchService};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
