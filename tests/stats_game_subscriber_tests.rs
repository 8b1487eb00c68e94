mod utils;

use std::time::Duration;

use darts::game::{InMode, OutMode};
use utils::TestSetupBuilder;

#[tokio::test]
async fn stats_are_recorded_when_a_game_is_won() {
    let setup = TestSetupBuilder::new()
        .with_human("alice")
        .with_human("bob")
        .build()
        .await;
    let alice = setup.players[0].clone();
    let bob = setup.players[1].clone();
    let game = setup.start_game(100, InMode::StraightIn, OutMode::DoubleOut).await;
    let service = &setup.app_state.game_service;

    // alice: T20 leaves 40, bob: three ones, alice: D20
    service.submit_throw(game.id(), alice.id, 20, 3, 1).await.unwrap();
    service.submit_throw(game.id(), alice.id, 0, 1, 2).await.unwrap();
    service.submit_throw(game.id(), alice.id, 0, 1, 3).await.unwrap();
    for dart_number in 1..=3 {
        service
            .submit_throw(game.id(), bob.id, 1, 1, dart_number)
            .await
            .unwrap();
    }
    service.submit_throw(game.id(), alice.id, 20, 2, 1).await.unwrap();

    let stats_service = &setup.app_state.stats_service;
    let mut alice_stats = stats_service.get_player_statistics(alice.id).await.unwrap();
    for _ in 0..200 {
        if alice_stats.total_games() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        alice_stats = stats_service.get_player_statistics(alice.id).await.unwrap();
    }

    assert_eq!(alice_stats.total_games(), 1);
    assert_eq!(alice_stats.wins(), 1);
    assert_eq!(alice_stats.total_darts(), 4);
    assert_eq!(alice_stats.total_points(), 100);
    assert_eq!(alice_stats.highest_checkout(), 40);
    assert_eq!(alice_stats.best_3_dart_score(), 75);

    let bob_stats = stats_service.get_player_statistics(bob.id).await.unwrap();
    assert_eq!(bob_stats.total_games(), 1);
    assert_eq!(bob_stats.wins(), 0);
    assert_eq!(bob_stats.total_points(), 3);

    let alice_rating = stats_service.current_rating(alice.id).await.unwrap();
    let bob_rating = stats_service.current_rating(bob.id).await.unwrap();
    assert!(alice_rating.rating() > bob_rating.rating());

    setup.shutdown().await;
}
