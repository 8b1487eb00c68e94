// Public API
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use commands::{CommandOutcome, GameCommand};
pub use core::{
    evaluate_dart, DartThrowRecord, DartVerdict, Game, GameError, GameStatus, GameType, InMode,
    OutMode, PlayerGameState, ThrowOutcome, DARTS_PER_TURN,
};
pub use repository::{GameRepository, InMemoryGameRepository};
pub use score::{Multiplier, Score, BULL, MISS};
pub use service::GameService;

// Internal modules
mod cleanup_task;
mod commands;
mod core;
mod repository;
mod score;
mod service;
