use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::calculator::JellyBeanScorer;
use crate::{
    event::{EventError, EventHandler, EventKind, ExperimentEvent},
    game::{lifecycle::ANSWER_STAGE, repository::GameRepository, Task},
    player::repository::PlayerRepository,
    shared::AppError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRoundScore {
    pub player_id: String,
    pub round_score: u32,
    pub total_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageScoring {
    /// The stage is not the jelly-bean answer stage
    Skipped,
    Scored(Vec<PlayerRoundScore>),
}

/// Scores the players of a game when its jelly-bean answer stage ends
pub struct ScoringService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    scorer: JellyBeanScorer,
}

impl ScoringService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        scorer: JellyBeanScorer,
    ) -> Self {
        Self {
            game_repository,
            player_repository,
            scorer,
        }
    }

    #[instrument(skip(self))]
    pub async fn score_stage(
        &self,
        game_id: &str,
        round_index: usize,
        stage_index: usize,
    ) -> Result<StageScoring, AppError> {
        let game = self
            .game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;

        let Some(round) = game.rounds.get(round_index) else {
            return Ok(StageScoring::Skipped);
        };
        let is_answer_stage = round
            .stages
            .get(stage_index)
            .is_some_and(|stage| stage.name == ANSWER_STAGE);

        if !is_answer_stage || round.task != Task::Jellybeans {
            debug!(game_id = %game_id, round_index, stage_index, "Stage is not scored");
            return Ok(StageScoring::Skipped);
        }

        let mut scores = Vec::with_capacity(game.player_ids.len());
        for player_id in &game.player_ids {
            let round_record = self
                .player_repository
                .get_player(player_id)
                .await?
                .and_then(|player| player.round(&round.id).cloned());
            if round_record.as_ref().is_some_and(|r| r.score.is_some()) {
                debug!(
                    player_id = %player_id,
                    round_id = %round.id,
                    "Round already scored, skipping"
                );
                continue;
            }

            let guess = round_record.and_then(|r| r.guess);

            let round_score = self.scorer.round_score(guess);
            let player = self
                .player_repository
                .record_round_score(player_id, &round.id, round_score)
                .await?;

            debug!(
                player_id = %player_id,
                guess = ?guess,
                round_score,
                total_score = player.score,
                "Jelly bean guess scored"
            );

            scores.push(PlayerRoundScore {
                player_id: player_id.clone(),
                round_score,
                total_score: player.score,
            });
        }

        info!(game_id = %game_id, player_count = scores.len(), "Jelly bean round scored");
        Ok(StageScoring::Scored(scores))
    }
}

/// Applies scoring whenever a stage ends
pub struct ScoringHandler {
    scoring: Arc<ScoringService>,
}

impl ScoringHandler {
    pub fn new(scoring: Arc<ScoringService>) -> Self {
        Self { scoring }
    }
}

#[async_trait]
impl EventHandler for ScoringHandler {
    async fn handle(&self, event: &ExperimentEvent) -> Result<Vec<ExperimentEvent>, EventError> {
        let EventKind::StageEnded {
            game_id,
            round_index,
            stage_index,
        } = &event.kind
        else {
            return Ok(vec![]);
        };

        if let Err(e) = self
            .scoring
            .score_stage(game_id, *round_index, *stage_index)
            .await
        {
            error!(game_id = %game_id, error = %e, "Failed to score stage");
        }
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "ScoringHandler"
    }
}
