use async_trait::async_trait;
use tracing::{instrument, trace};

use super::models::{GameModel, Task};
use crate::event::{EventError, EventHandler, EventKind, ExperimentEvent};

pub const JELLY_BEANS_ROUND: &str = "Round 1 - Jelly Beans";
pub const MINESWEEPER_ROUND: &str = "Round 2 - Minesweeper";
pub const ANSWER_STAGE: &str = "Answer";
pub const RESULT_STAGE: &str = "Result";
pub const PLAY_STAGE: &str = "Play";

/// Game start hook: lays out the rounds and stages every game plays
#[instrument(skip(game), fields(game_id = %game.id))]
pub fn on_game_start(game: &mut GameModel) {
    let jelly_beans = game.add_round(JELLY_BEANS_ROUND, Task::Jellybeans);
    jelly_beans.add_stage(ANSWER_STAGE, 300);
    jelly_beans.add_stage(RESULT_STAGE, 120);

    let minesweeper = game.add_round(MINESWEEPER_ROUND, Task::Minesweeper);
    minesweeper.add_stage(PLAY_STAGE, 300);

    trace!(round_count = game.rounds.len(), "Rounds added to game");
}

/// Round/stage/game hooks that currently have nothing to do
///
/// Registered so every lifecycle event has a consumer; new per-round logic
/// (e.g. minesweeper) hangs off these match arms.
pub struct LifecycleHandler;

#[async_trait]
impl EventHandler for LifecycleHandler {
    async fn handle(&self, event: &ExperimentEvent) -> Result<Vec<ExperimentEvent>, EventError> {
        match &event.kind {
            EventKind::RoundStarted {
                game_id,
                round_index,
            } => trace!(game_id = %game_id, round_index, "Round started"),
            EventKind::StageStarted {
                game_id,
                round_index,
                stage_index,
            } => trace!(game_id = %game_id, round_index, stage_index, "Stage started"),
            EventKind::RoundEnded {
                game_id,
                round_index,
            } => trace!(game_id = %game_id, round_index, "Round ended"),
            EventKind::GameEnded { game_id } => trace!(game_id = %game_id, "Game ended"),
            _ => {}
        }
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "LifecycleHandler"
    }
}
