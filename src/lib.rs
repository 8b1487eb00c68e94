// Library crate for the darts scoring service
// This file exposes the public API for integration tests and the demo binary

pub mod bot;
pub mod event;
pub mod game;
pub mod player;
pub mod rating;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use bot::{BotStrategy, SchedulerConfig, SkillBasedStrategy, SkillLevel, TurnScheduler};
pub use event::{EventBus, EventSubscription, GameEvent};
pub use game::{Game, GameService, GameType, InMode, OutMode, Score};
pub use player::{InMemoryPlayerDirectory, PlayerLookup};
pub use rating::{MatchmakingConfig, SkillRating};
pub use shared::{AppError, AppState, GameId, PlayerId, ThrowId};
pub use stats::{PlayerStatistics, StatsService};
