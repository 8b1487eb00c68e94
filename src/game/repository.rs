use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::core::{DartThrowRecord, Game};
use crate::shared::{AppError, GameId};

/// Persistence capability for game aggregates and their throw logs
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn get_by_id(&self, game_id: GameId) -> Result<Option<Game>, AppError>;

    async fn save(&self, game: &Game) -> Result<(), AppError>;

    /// Appends to the game's throw log; records are never rewritten
    async fn append_throw(&self, record: &DartThrowRecord) -> Result<(), AppError>;

    async fn throws_for_game(&self, game_id: GameId) -> Result<Vec<DartThrowRecord>, AppError>;
}

/// In-memory implementation of GameRepository for development and testing
#[derive(Default)]
pub struct InMemoryGameRepository {
    games: Arc<RwLock<HashMap<GameId, Game>>>,
    throws: Arc<RwLock<HashMap<GameId, Vec<DartThrowRecord>>>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn get_by_id(&self, game_id: GameId) -> Result<Option<Game>, AppError> {
        let games = self.games.read().await;
        Ok(games.get(&game_id).cloned())
    }

    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    async fn save(&self, game: &Game) -> Result<(), AppError> {
        let mut games = self.games.write().await;
        games.insert(game.id(), game.clone());
        debug!(status = ?game.status(), "Saved game");
        Ok(())
    }

    async fn append_throw(&self, record: &DartThrowRecord) -> Result<(), AppError> {
        let mut throws = self.throws.write().await;
        throws
            .entry(record.game_id)
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn throws_for_game(&self, game_id: GameId) -> Result<Vec<DartThrowRecord>, AppError> {
        let throws = self.throws.read().await;
        Ok(throws.get(&game_id).cloned().unwrap_or_default())
    }
}
