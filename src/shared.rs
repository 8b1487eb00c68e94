use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::bot::{BotGameSubscriber, BotStrategy, SchedulerConfig, TurnScheduler};
use crate::event::{EventBus, EventSubscription};
use crate::game::{start_cleanup_task, CleanupConfig, GameError, GameRepository, GameService};
use crate::player::PlayerLookup;
use crate::stats::{StatsError, StatsGameSubscriber, StatsRepository, StatsService};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifies one game aggregate
    GameId
);
entity_id!(
    /// Identifies a human or bot player
    PlayerId
);
entity_id!(
    /// Identifies one recorded dart
    ThrowId
);

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            GameError::InvalidState(msg) => AppError::InvalidState(msg),
        }
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<dyn PlayerLookup>,
    pub game_service: Arc<GameService>,
    pub stats_service: Arc<StatsService>,
    pub event_bus: EventBus,
}

/// Handles of the tasks started by [`AppState::start_background_tasks`]
pub struct BackgroundTasks {
    pub scheduler: TurnScheduler,
    pub handles: Vec<JoinHandle<()>>,
}

impl AppState {
    pub fn new(
        players: Arc<dyn PlayerLookup>,
        game_repository: Arc<dyn GameRepository>,
        stats_repository: Arc<dyn StatsRepository>,
    ) -> Self {
        let event_bus = EventBus::new();
        let game_service = Arc::new(GameService::new(
            game_repository,
            players.clone(),
            event_bus.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(stats_repository));

        Self {
            players,
            game_service,
            stats_service,
            event_bus,
        }
    }

    /// Starts the bot turn worker, the bot and stats subscribers and the idle game cleanup.
    /// Everything stops once `cancel` fires.
    pub fn start_background_tasks(
        &self,
        strategy: Arc<dyn BotStrategy>,
        config: SchedulerConfig,
        cancel: CancellationToken,
    ) -> BackgroundTasks {
        let (scheduler, worker) = TurnScheduler::spawn(
            self.game_service.clone(),
            self.players.clone(),
            strategy,
            config,
            cancel.clone(),
        );

        let bot_subscriber = BotGameSubscriber::new(scheduler.clone(), self.players.clone());
        let stats_subscriber =
            StatsGameSubscriber::new(self.stats_service.clone(), self.game_service.clone());

        let bot_handle = EventSubscription::new(Arc::new(bot_subscriber), self.event_bus.clone())
            .start(cancel.clone());
        let stats_handle =
            EventSubscription::new(Arc::new(stats_subscriber), self.event_bus.clone())
                .start(cancel.clone());
        let cleanup_handle = start_cleanup_task(
            self.game_service.clone(),
            CleanupConfig::from_env(),
            cancel,
        );

        BackgroundTasks {
            scheduler,
            handles: vec![worker, bot_handle, stats_handle, cleanup_handle],
        }
    }
}
