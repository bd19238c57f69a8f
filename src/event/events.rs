use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event delivered through the bus
///
/// Every event carries its own id. A re-delivery of the same logical event
/// keeps the id, which is what the dispatcher deduplicates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentEvent {
    pub id: Uuid,
    pub kind: EventKind,
}

/// Field changes and lifecycle transitions observed on experiment entities
///
/// Events represent facts about things that have already happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // Player field changes
    /// A participant submitted their group code on the onboarding screen
    GroupCodeChanged {
        player_id: String,
        group_code: String,
    },

    // Game field changes
    /// A new game was attached to a batch
    GameCreated { game_id: String, batch_id: String },

    /// A player was added to a game
    PlayerAssigned { game_id: String, player_id: String },

    // Lifecycle events
    GameStarted { game_id: String },

    RoundStarted { game_id: String, round_index: usize },

    StageStarted {
        game_id: String,
        round_index: usize,
        stage_index: usize,
    },

    /// A stage finished; scoring hooks react to this
    StageEnded {
        game_id: String,
        round_index: usize,
        stage_index: usize,
    },

    RoundEnded { game_id: String, round_index: usize },

    GameEnded { game_id: String },
}

impl ExperimentEvent {
    /// Wraps an event kind with a fresh id
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }

    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            EventKind::GroupCodeChanged { .. } => "group_code_changed",
            EventKind::GameCreated { .. } => "game_created",
            EventKind::PlayerAssigned { .. } => "player_assigned",
            EventKind::GameStarted { .. } => "game_started",
            EventKind::RoundStarted { .. } => "round_started",
            EventKind::StageStarted { .. } => "stage_started",
            EventKind::StageEnded { .. } => "stage_ended",
            EventKind::RoundEnded { .. } => "round_ended",
            EventKind::GameEnded { .. } => "game_ended",
        }
    }

    /// The game this event concerns, if any
    pub fn game_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::GroupCodeChanged { .. } => None,
            EventKind::GameCreated { game_id, .. }
            | EventKind::PlayerAssigned { game_id, .. }
            | EventKind::GameStarted { game_id }
            | EventKind::RoundStarted { game_id, .. }
            | EventKind::StageStarted { game_id, .. }
            | EventKind::StageEnded { game_id, .. }
            | EventKind::RoundEnded { game_id, .. }
            | EventKind::GameEnded { game_id } => Some(game_id),
        }
    }
}

impl From<EventKind> for ExperimentEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}
