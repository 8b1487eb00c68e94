use darts::{
    bot::{BotDifficulty, SchedulerConfig, SkillBasedStrategy},
    game::{GameType, InMemoryGameRepository, InMode, OutMode},
    player::InMemoryPlayerDirectory,
    shared::{AppError, AppState},
    stats::InMemoryStatsRepository,
    GameEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "darts=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting darts bot match");

    let directory = Arc::new(InMemoryPlayerDirectory::new());
    let app_state = AppState::new(
        directory.clone(),
        Arc::new(InMemoryGameRepository::new()),
        Arc::new(InMemoryStatsRepository::new()),
    );

    let cancel = CancellationToken::new();
    let mut events = app_state.event_bus.subscribe();
    let tasks = app_state.start_background_tasks(
        Arc::new(SkillBasedStrategy::new(None)),
        SchedulerConfig::from_env(),
        cancel.clone(),
    );

    let first = directory.register_bot(BotDifficulty::Hard.into()).await;
    let second = directory.register_bot(BotDifficulty::Medium.into()).await;

    let game_type = GameType::Standard501;
    let game = app_state
        .game_service
        .create_game(
            game_type,
            game_type.default_starting_score().unwrap_or(501),
            InMode::StraightIn,
            OutMode::DoubleOut,
        )
        .await?;
    app_state.game_service.add_player(game.id(), first.id).await?;
    app_state.game_service.add_player(game.id(), second.id).await?;
    app_state.game_service.start_game(game.id()).await?;

    let winner = loop {
        match events.recv().await {
            Ok(GameEvent::GameWon {
                game_id, winner, ..
            }) if game_id == game.id() => break winner,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Demo listener lagged"),
            Err(RecvError::Closed) => {
                return Err(AppError::Internal("event bus closed".to_string()));
            }
        }
    };

    // Statistics are folded in by a subscriber of the same event
    for _ in 0..100 {
        let stats = app_state.stats_service.get_player_statistics(winner).await?;
        if stats.total_games() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for player in [&first, &second] {
        let stats = app_state.stats_service.get_player_statistics(player.id).await?;
        let rating = app_state.stats_service.current_rating(player.id).await?;
        let report = serde_json::json!({
            "player": player.username,
            "winner": player.id == winner,
            "statistics": stats,
            "three_dart_average": stats.average_3_dart(),
            "rating": rating,
        });
        let pretty = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        println!("{}", pretty);
    }

    cancel.cancel();
    futures::future::join_all(tasks.handles).await;
    info!("Shutdown complete");
    Ok(())
}
