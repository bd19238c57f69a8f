// Group-code matching: batch selection, game creation/joining and the
// one-time game setup that follows.

// Public API
pub use errors::MatchError;
pub use event_handlers::{GameInitializeHandler, GroupCodeMatchHandler};
pub use service::{Applied, GameInitOutcome, MatchOutcome, MatchingService};

// Internal modules
mod errors;
mod event_handlers;
mod service;
