//! Onboarding to game start, driven through the event dispatcher

mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use jellybeans::{
    app,
    batch::BatchStatus,
    game::GameStatus,
    player::types::PlayerResponse,
    EventKind, ExperimentEvent,
};
use utils::{PlayerAssertion, TestSetupBuilder};

#[tokio::test]
async fn test_same_group_code_shares_one_game() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_running_batch("2024-01-01T10:00:00Z")
        .build()
        .await;

    setup.submit_group_code("alice", "blue-7").await;
    setup.submit_group_code("bob", "blue-7").await;

    let game_ids = setup.game_ids_in_batch(0).await;
    assert_eq!(game_ids.len(), 1);
    let game = setup.game(&game_ids[0]).await;

    assert_eq!(game.starting_player_id, "alice");
    assert_eq!(game.group_code, "blue-7");
    assert_eq!(game.status, GameStatus::Running);
    assert!(game.has_player("alice"));
    assert!(game.has_player("bob"));
    assert_eq!(game.player_ids.len(), 2);

    let batch_id = setup.batches[0].id.clone();
    PlayerAssertion::for_player(&setup, "alice")
        .await
        .in_batch(&batch_id)
        .in_game(&game.id);
    PlayerAssertion::for_player(&setup, "bob")
        .await
        .in_batch(&batch_id)
        .in_game(&game.id);
}

#[tokio::test]
async fn test_different_group_codes_get_separate_games() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_running_batch("2024-01-01T10:00:00Z")
        .build()
        .await;

    setup.submit_group_code("alice", "red").await;
    setup.submit_group_code("bob", "green").await;
    setup.submit_group_code("charlie", "red").await;
    setup.submit_group_code("david", "green").await;

    let game_ids = setup.game_ids_in_batch(0).await;
    assert_eq!(game_ids.len(), 2);

    let red = setup.game(&game_ids[0]).await;
    let green = setup.game(&game_ids[1]).await;
    assert_eq!(red.group_code, "red");
    assert_eq!(green.group_code, "green");

    PlayerAssertion::for_player(&setup, "charlie").await.in_game(&red.id);
    PlayerAssertion::for_player(&setup, "david").await.in_game(&green.id);
    assert_eq!(green.starting_player_id, "bob");
}

#[tokio::test]
async fn test_oldest_running_batch_receives_players() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_batch("2024-03-01T10:00:00Z", BatchStatus::Running)
        .with_batch("2023-12-31T09:00:00Z", BatchStatus::Ended)
        .with_batch("2024-02-01T10:00:00Z", BatchStatus::Running)
        .build()
        .await;

    setup.submit_group_code("alice", "oak").await;

    let expected = setup.batches[2].id.clone();
    PlayerAssertion::for_player(&setup, "alice")
        .await
        .in_batch(&expected);
    assert_eq!(setup.game_ids_in_batch(2).await.len(), 1);
    assert!(setup.game_ids_in_batch(0).await.is_empty());
}

#[tokio::test]
async fn test_no_open_batch_leaves_player_unassigned() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_batch("2024-01-01T10:00:00Z", BatchStatus::Ended)
        .build()
        .await;

    setup.submit_group_code("alice", "blue-7").await;

    PlayerAssertion::for_player(&setup, "alice")
        .await
        .without_batch()
        .not_in_game();
    assert!(setup.game_ids_in_batch(0).await.is_empty());
}

#[tokio::test]
async fn test_empty_group_code_is_not_matched() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_running_batch("2024-01-01T10:00:00Z")
        .build()
        .await;

    setup.submit_group_code("alice", "").await;

    let alice = PlayerAssertion::for_player(&setup, "alice")
        .await
        .without_batch()
        .not_in_game()
        .into_model();
    assert_eq!(alice.group_code.as_deref(), Some(""));
    assert!(!alice.initialized);
}

#[tokio::test]
async fn test_redelivered_group_code_event_matches_once() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_running_batch("2024-01-01T10:00:00Z")
        .build()
        .await;

    setup
        .player_service
        .submit_group_code("alice", "blue-7")
        .await
        .unwrap();
    let event = setup.bus_receiver.lock().await.try_recv().unwrap();

    assert!(setup.redeliver(event.clone()).await > 0);
    assert_eq!(setup.redeliver(event).await, 0);

    // A fresh event for the same change still finds the player initialized
    setup
        .redeliver(ExperimentEvent::new(EventKind::GroupCodeChanged {
            player_id: "alice".to_string(),
            group_code: "blue-7".to_string(),
        }))
        .await;

    assert_eq!(setup.game_ids_in_batch(0).await.len(), 1);
    let game_id = setup.game_ids_in_batch(0).await.remove(0);
    assert_eq!(setup.game(&game_id).await.player_ids, vec!["alice".to_string()]);
}

#[tokio::test]
async fn test_group_code_flow_over_http() {
    let setup = TestSetupBuilder::new()
        .with_running_batch("2024-01-01T10:00:00Z")
        .build()
        .await;
    let listener = Arc::new(app::dispatcher(&setup.state)).start_listening();
    let router = app::router(setup.state.clone());

    let mut player_ids = Vec::new();
    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/players")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let player: PlayerResponse = serde_json::from_slice(&body).unwrap();
        player_ids.push(player.id);
    }

    for player_id in &player_ids {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/players/{}/group-code", player_id))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"group_code": "maple"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Callbacks run on the listener task
    let mut joined = false;
    for _ in 0..50 {
        let games = setup.game_ids_in_batch(0).await;
        if let Some(game_id) = games.first() {
            let game = setup.game(game_id).await;
            if game.player_ids.len() == 2 && game.status == GameStatus::Running {
                joined = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(joined, "both players should end up in one running game");

    listener.abort();
}
