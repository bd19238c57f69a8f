use serde::{Deserialize, Serialize};

use super::models::{GameModel, GameStatus, Round, Treatment};

/// Response for game information
#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub id: String,
    pub batch_id: String,
    pub group_code: String,
    pub starting_player_id: String,
    pub treatment: Treatment,
    pub status: GameStatus,
    pub player_ids: Vec<String>,
    pub rounds: Vec<Round>,
    pub current_round: Option<String>,
    pub current_stage: Option<String>,
}

impl From<GameModel> for GameResponse {
    fn from(game: GameModel) -> Self {
        let current_round = game.current_round().map(|r| r.name.clone());
        let current_stage = game.current_stage().map(|s| s.name.clone());

        Self {
            id: game.id,
            batch_id: game.batch_id,
            group_code: game.group_code,
            starting_player_id: game.starting_player_id,
            treatment: game.treatment,
            status: game.status,
            player_ids: game.player_ids,
            rounds: game.rounds,
            current_round,
            current_stage,
        }
    }
}
