#![allow(dead_code)] // Shared between test binaries that use different parts

use tokio::sync::broadcast::error::TryRecvError;

use jellybeans::ExperimentEvent;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Dispatch everything currently waiting on the bus; returns how many
    /// events reached the handlers (follow-ups included)
    pub async fn pump(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.bus_receiver.lock().await.try_recv();
            match next {
                Ok(event) => delivered += self.dispatcher.dispatch(event).await,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        delivered
    }

    /// Submit the onboarding form and let the callbacks run
    pub async fn submit_group_code(&self, player: &str, group_code: &str) {
        self.player_service
            .submit_group_code(player, group_code)
            .await
            .unwrap();
        self.pump().await;
    }

    /// Deliver an event straight to the dispatcher, as a re-delivery would
    pub async fn redeliver(&self, event: ExperimentEvent) -> usize {
        self.dispatcher.dispatch(event).await
    }

    pub async fn submit_guess(&self, player: &str, guess: f64) {
        self.player_service.submit_guess(player, guess).await.unwrap();
    }

    /// End the current stage of a game and let the callbacks run
    pub async fn advance_stage(&self, game_id: &str) {
        let service = jellybeans::game::GameService::new(
            self.game_repository.clone(),
            self.player_repository.clone(),
        );
        for event in service.advance_stage(game_id).await.unwrap() {
            self.state.event_bus.emit(event);
        }
        self.pump().await;
    }
}
