use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Configuration bundle attached to a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub player_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    Created,
    Running,
    Ended,
}

/// Kind of task played during a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Task {
    Jellybeans,
    Minesweeper,
}

/// A timed sub-phase of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub duration_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub name: String,
    pub task: Task,
    pub stages: Vec<Stage>,
}

impl Round {
    pub fn new(name: impl Into<String>, task: Task) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            task,
            stages: Vec::new(),
        }
    }

    pub fn add_stage(&mut self, name: impl Into<String>, duration_secs: u32) -> &Stage {
        self.stages.push(Stage {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration_secs,
        });
        &self.stages[self.stages.len() - 1]
    }
}

/// Position of the stage currently being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePointer {
    pub round_index: usize,
    pub stage_index: usize,
}

/// One play-through tied to a group code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameModel {
    pub id: String,
    pub batch_id: String,
    pub group_code: String,
    pub starting_player_id: String,
    pub treatment: Treatment,
    /// Set once the game setup (starting player + start) has run
    pub initialized: bool,
    pub status: GameStatus,
    pub player_ids: Vec<String>,
    pub rounds: Vec<Round>,
    pub current: Option<StagePointer>,
}

impl GameModel {
    /// Creates a game that has not been set up yet
    pub fn new(
        batch_id: impl Into<String>,
        group_code: impl Into<String>,
        starting_player_id: impl Into<String>,
        treatment: Treatment,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.into(),
            group_code: group_code.into(),
            starting_player_id: starting_player_id.into(),
            treatment,
            initialized: false,
            status: GameStatus::Created,
            player_ids: Vec::new(),
            rounds: Vec::new(),
            current: None,
        }
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|p| p == player_id)
    }

    /// Adds a player once; returns false if they were already in the game
    pub fn add_player(&mut self, player_id: &str) -> bool {
        if self.has_player(player_id) {
            return false;
        }
        self.player_ids.push(player_id.to_string());
        true
    }

    pub fn add_round(&mut self, name: impl Into<String>, task: Task) -> &mut Round {
        self.rounds.push(Round::new(name, task));
        let last = self.rounds.len() - 1;
        &mut self.rounds[last]
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current.and_then(|p| self.rounds.get(p.round_index))
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        self.current.and_then(|p| {
            self.rounds
                .get(p.round_index)
                .and_then(|round| round.stages.get(p.stage_index))
        })
    }

    /// First playable stage, skipping rounds without stages
    pub fn first_stage(&self) -> Option<StagePointer> {
        self.stage_after(None)
    }

    /// Stage following the given one, crossing into later rounds if needed
    pub fn stage_after(&self, pointer: Option<StagePointer>) -> Option<StagePointer> {
        let (mut round_index, mut stage_index) = match pointer {
            Some(p) => (p.round_index, p.stage_index + 1),
            None => (0, 0),
        };

        while let Some(round) = self.rounds.get(round_index) {
            if stage_index < round.stages.len() {
                return Some(StagePointer {
                    round_index,
                    stage_index,
                });
            }
            round_index += 1;
            stage_index = 0;
        }
        None
    }
}
