//! Test assertion helpers - fluent API for verifying player state
#![allow(dead_code)] // Test utilities may not all be used in every test

use jellybeans::player::PlayerModel;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct PlayerAssertion {
    player: PlayerModel,
}

impl PlayerAssertion {
    pub async fn for_player(setup: &TestSetup, player_id: &str) -> Self {
        Self {
            player: setup.player(player_id).await,
        }
    }

    pub fn in_game(self, game_id: &str) -> Self {
        assert_eq!(
            self.player.game_id.as_deref(),
            Some(game_id),
            "{} should be in game {}",
            self.player.id,
            game_id
        );
        self
    }

    pub fn not_in_game(self) -> Self {
        assert!(
            self.player.game_id.is_none(),
            "{} should not be in a game",
            self.player.id
        );
        self
    }

    pub fn in_batch(self, batch_id: &str) -> Self {
        assert_eq!(
            self.player.batch_id.as_deref(),
            Some(batch_id),
            "{} should be in batch {}",
            self.player.id,
            batch_id
        );
        self
    }

    pub fn without_batch(self) -> Self {
        assert!(
            self.player.batch_id.is_none(),
            "{} should not have a batch",
            self.player.id
        );
        self
    }

    pub fn with_total_score(self, expected: u32) -> Self {
        assert_eq!(
            self.player.score, expected,
            "{} has wrong total score",
            self.player.id
        );
        self
    }

    pub fn with_round_score(self, round_id: &str, expected: u32) -> Self {
        let round_score = self.player.round(round_id).and_then(|r| r.score);
        assert_eq!(
            round_score,
            Some(expected),
            "{} has wrong score for round {}",
            self.player.id,
            round_id
        );
        self
    }

    pub fn into_model(self) -> PlayerModel {
        self.player
    }
}
