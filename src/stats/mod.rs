pub mod collector;
pub mod service;

mod errors;
pub mod models;
pub mod repository;

pub use collector::summarize_game;
pub use errors::StatsError;
pub use models::*;
pub use repository::{InMemoryStatsRepository, StatsRepository};
pub use service::{StatsGameSubscriber, StatsService};
