use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::service::GameService;

/// Configuration for the idle game cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to look for idle games
    pub cleanup_interval: Duration,
    /// How long a game must go without a mutation before its resources are released
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(5 * 60),      // 5 minutes
            inactivity_threshold: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

impl CleanupConfig {
    /// Reads `DARTS_CLEANUP_INTERVAL_SECS` and `DARTS_GAME_IDLE_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cleanup_interval: env_secs("DARTS_CLEANUP_INTERVAL_SECS", defaults.cleanup_interval),
            inactivity_threshold: env_secs("DARTS_GAME_IDLE_SECS", defaults.inactivity_threshold),
        }
    }
}

fn env_secs(key: &str, default: Duration) -> Duration {
    match env::var(key).map(|raw| raw.parse::<u64>()) {
        Ok(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
        Ok(_) => {
            warn!(key, "Ignoring invalid cleanup setting");
            default
        }
        Err(_) => default,
    }
}

/// Starts the background task that periodically releases idle games
pub fn start_cleanup_task(
    game_service: Arc<GameService>,
    config: CleanupConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting game cleanup background task"
    );

    tokio::spawn(async move {
        let mut cleanup_interval = interval(config.cleanup_interval);
        cleanup_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = cleanup_interval.tick() => {}
            }

            let released = game_service
                .release_idle_games(config.inactivity_threshold)
                .await;
            if released.is_empty() {
                debug!("No idle games to release");
            } else {
                info!(released_count = released.len(), "Game cleanup completed");
            }
        }

        info!("Game cleanup task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;
    use crate::game::{GameType, InMemoryGameRepository, InMode, OutMode};
    use crate::player::InMemoryPlayerDirectory;

    #[test]
    fn default_config_is_minutes_and_an_hour() {
        let config = CleanupConfig::default();
        assert_eq!(config.cleanup_interval, Duration::from_secs(300));
        assert_eq!(config.inactivity_threshold, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn releases_abandoned_lobbies_until_cancelled() {
        let event_bus = EventBus::new();
        let service = Arc::new(GameService::new(
            Arc::new(InMemoryGameRepository::new()),
            Arc::new(InMemoryPlayerDirectory::new()),
            event_bus.clone(),
        ));
        let game = service
            .create_game(GameType::Standard501, 501, InMode::StraightIn, OutMode::DoubleOut)
            .await
            .unwrap();
        let mut game_events = event_bus.subscribe_to_game(game.id()).await;

        let cancel = CancellationToken::new();
        let handle = start_cleanup_task(
            service.clone(),
            CleanupConfig {
                cleanup_interval: Duration::from_millis(10),
                inactivity_threshold: Duration::ZERO,
            },
            cancel.clone(),
        );

        let closed = tokio::time::timeout(Duration::from_secs(1), game_events.recv()).await;
        assert!(matches!(
            closed,
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed))
        ));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
