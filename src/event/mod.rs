// Event-driven architecture components
//
// Field changes and lifecycle transitions on experiment entities are
// published as typed events and routed to the handlers that react to them.

// Public API - what other modules can use
pub use bus::EventBus;
pub use dispatcher::EventDispatcher;
pub use events::{EventKind, ExperimentEvent};
pub use handler::{EventError, EventHandler};

// Internal modules
mod bus;
mod dispatcher;
mod events;
mod handler;
