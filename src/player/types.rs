use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::models::{OnboardingStep, PlayerModel, PlayerRound};

/// Request payload for the onboarding form
///
/// The code is taken verbatim, including empty strings.
#[derive(Debug, Deserialize)]
pub struct GroupCodeRequest {
    pub group_code: String,
}

/// Response after the group code was stored
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct OnboardingResponse {
    pub player_id: String,
    pub group_code: String,
    /// Step the participant's UI should move to
    pub next_step: OnboardingStep,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub guess: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GuessResponse {
    pub player_id: String,
    pub round_id: String,
    pub guess: f64,
}

/// Response for player information
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub id: String,
    pub group_code: Option<String>,
    pub score: u32,
    pub batch_id: Option<String>,
    pub game_id: Option<String>,
    pub onboarding: OnboardingStep,
    pub rounds: HashMap<String, PlayerRound>,
}

impl From<PlayerModel> for PlayerResponse {
    fn from(player: PlayerModel) -> Self {
        Self {
            id: player.id,
            group_code: player.group_code,
            score: player.score,
            batch_id: player.batch_id,
            game_id: player.game_id,
            onboarding: player.onboarding,
            rounds: player.rounds,
        }
    }
}
