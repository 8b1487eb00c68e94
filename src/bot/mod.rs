pub mod board;
pub mod bot_game_subscriber;
pub mod checkout;
pub mod scheduler;
pub mod skill_strategy;
pub mod types;

pub use bot_game_subscriber::BotGameSubscriber;
pub use scheduler::{SchedulerConfig, TurnScheduler};
pub use skill_strategy::{BotTurn, SkillBasedStrategy};
pub use types::{BotDifficulty, BotStrategy, SkillLevel};
