use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Where a participant is in the onboarding flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OnboardingStep {
    /// Group code form is showing
    Introduction,
    /// Group code submitted, waiting to be placed in a game
    Lobby,
}

/// Per-round view of a player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRound {
    pub guess: Option<f64>,
    pub score: Option<u32>,
}

/// A participant in the experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerModel {
    pub id: String,
    pub group_code: Option<String>,
    /// Running total across rounds
    pub score: u32,
    pub batch_id: Option<String>,
    /// Set once matching has run for this player
    pub initialized: bool,
    pub game_id: Option<String>,
    pub onboarding: OnboardingStep,
    /// Keyed by round id
    pub rounds: HashMap<String, PlayerRound>,
}

impl PlayerModel {
    /// Creates a freshly connected participant with a generated id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_code: None,
            score: 0,
            batch_id: None,
            initialized: false,
            game_id: None,
            onboarding: OnboardingStep::Introduction,
            rounds: HashMap::new(),
        }
    }

    pub fn round(&self, round_id: &str) -> Option<&PlayerRound> {
        self.rounds.get(round_id)
    }

    /// Stores a round score and adds it to the running total
    ///
    /// A round is scored once; returns false and changes nothing if it
    /// already has a score.
    pub fn record_round_score(&mut self, round_id: &str, round_score: u32) -> bool {
        let round = self.rounds.entry(round_id.to_string()).or_default();
        if round.score.is_some() {
            return false;
        }
        round.score = Some(round_score);
        self.score = self.score.saturating_add(round_score);
        true
    }
}

impl Default for PlayerModel {
    fn default() -> Self {
        Self::new()
    }
}
