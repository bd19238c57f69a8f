#![allow(dead_code)] // Shared between test binaries that use different parts

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use jellybeans::{
    app,
    batch::{
        repository::{BatchRepository, InMemoryBatchRepository},
        BatchModel, BatchStatus,
    },
    game::repository::{GameRepository, InMemoryGameRepository},
    player::{
        repository::{InMemoryPlayerRepository, PlayerRepository},
        PlayerService,
    },
    AppState, EventBus, EventDispatcher, ExperimentConfig, ExperimentEvent,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub player_repository: Arc<InMemoryPlayerRepository>,
    pub batch_repository: Arc<InMemoryBatchRepository>,
    pub game_repository: Arc<InMemoryGameRepository>,
    pub player_service: PlayerService,
    pub dispatcher: EventDispatcher,
    /// Everything published on the bus, drained by `pump`
    pub bus_receiver: Mutex<broadcast::Receiver<ExperimentEvent>>,
    pub batches: Vec<BatchModel>,
    pub players: Vec<String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    batches: Vec<(String, BatchStatus)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            batches: vec![],
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david"])
    }

    pub fn with_batch(mut self, created_at: &str, status: BatchStatus) -> Self {
        self.batches.push((created_at.to_string(), status));
        self
    }

    pub fn with_running_batch(self, created_at: &str) -> Self {
        self.with_batch(created_at, BatchStatus::Running)
    }

    pub async fn build(self) -> TestSetup {
        let player_repository = Arc::new(InMemoryPlayerRepository::new());
        let batch_repository = Arc::new(InMemoryBatchRepository::new());
        let game_repository = Arc::new(InMemoryGameRepository::new());
        let event_bus = EventBus::new(1000);

        let state = AppState::new(
            player_repository.clone(),
            batch_repository.clone(),
            game_repository.clone(),
            event_bus.clone(),
            ExperimentConfig::default(),
        );

        let mut batches = Vec::new();
        for (created_at, status) in self.batches {
            let mut batch = BatchModel::with_created_at(created_at);
            batch.status = status;
            batch_repository.create_batch(&batch).await.unwrap();
            batches.push(batch);
        }

        for player in &self.players {
            player_repository
                .create_player(&jellybeans::player::PlayerModel::with_id(player.as_str()))
                .await
                .unwrap();
        }

        let player_service = PlayerService::new(
            player_repository.clone(),
            game_repository.clone(),
            event_bus.clone(),
        );
        let bus_receiver = Mutex::new(event_bus.subscribe());
        let dispatcher = app::dispatcher(&state);

        TestSetup {
            state,
            player_repository,
            batch_repository,
            game_repository,
            player_service,
            dispatcher,
            bus_receiver,
            batches,
            players: self.players,
        }
    }
}

impl TestSetup {
    pub async fn game_ids_in_batch(&self, batch_index: usize) -> Vec<String> {
        self.batch_repository
            .get_batch(&self.batches[batch_index].id)
            .await
            .unwrap()
            .unwrap()
            .game_ids
    }

    pub async fn game(&self, game_id: &str) -> jellybeans::game::GameModel {
        self.game_repository
            .get_game(game_id)
            .await
            .unwrap()
            .expect("game should exist")
    }

    pub async fn player(&self, player_id: &str) -> jellybeans::player::PlayerModel {
        self.player_repository
            .get_player(player_id)
            .await
            .unwrap()
            .expect("player should exist")
    }
}
