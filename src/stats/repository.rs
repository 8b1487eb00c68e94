use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{models::PlayerStatistics, StatsError};
use crate::rating::SkillRating;
use crate::shared::{GameId, PlayerId};

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn get_statistics(&self, player_id: PlayerId)
        -> Result<Option<PlayerStatistics>, StatsError>;
    async fn save_statistics(
        &self,
        player_id: PlayerId,
        statistics: PlayerStatistics,
    ) -> Result<(), StatsError>;
    async fn get_rating(&self, player_id: PlayerId) -> Result<Option<SkillRating>, StatsError>;
    async fn save_rating(&self, player_id: PlayerId, rating: SkillRating)
        -> Result<(), StatsError>;
    /// Marks a game as folded into the statistics. Returns false if it already was.
    async fn record_game(&self, game_id: GameId) -> Result<bool, StatsError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    statistics: Arc<RwLock<HashMap<PlayerId, PlayerStatistics>>>,
    ratings: Arc<RwLock<HashMap<PlayerId, SkillRating>>>,
    recorded_games: Arc<RwLock<HashSet<GameId>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn get_statistics(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerStatistics>, StatsError> {
        let statistics = self.statistics.read().await;
        Ok(statistics.get(&player_id).copied())
    }

    async fn save_statistics(
        &self,
        player_id: PlayerId,
        statistics: PlayerStatistics,
    ) -> Result<(), StatsError> {
        let mut all = self.statistics.write().await;
        all.insert(player_id, statistics);
        Ok(())
    }

    async fn get_rating(&self, player_id: PlayerId) -> Result<Option<SkillRating>, StatsError> {
        let ratings = self.ratings.read().await;
        Ok(ratings.get(&player_id).copied())
    }

    async fn save_rating(
        &self,
        player_id: PlayerId,
        rating: SkillRating,
    ) -> Result<(), StatsError> {
        let mut ratings = self.ratings.write().await;
        ratings.insert(player_id, rating);
        Ok(())
    }

    async fn record_game(&self, game_id: GameId) -> Result<bool, StatsError> {
        let mut recorded = self.recorded_games.write().await;
        Ok(recorded.insert(game_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_statistics_and_ratings_per_player() {
        let repo = InMemoryStatsRepository::new();
        let alice = PlayerId::new();
        let bob = PlayerId::new();

        let stats = PlayerStatistics::empty().with_game(true, 9, 301, Some(36));
        repo.save_statistics(alice, stats).await.unwrap();
        repo.save_rating(alice, SkillRating::default()).await.unwrap();

        assert_eq!(repo.get_statistics(alice).await.unwrap(), Some(stats));
        assert_eq!(
            repo.get_rating(alice).await.unwrap(),
            Some(SkillRating::default())
        );
        assert!(repo.get_statistics(bob).await.unwrap().is_none());
        assert!(repo.get_rating(bob).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn games_are_recorded_once() {
        let repo = InMemoryStatsRepository::new();
        let game_id = GameId::new();

        assert!(repo.record_game(game_id).await.unwrap());
        assert!(!repo.record_game(game_id).await.unwrap());
        assert!(repo.record_game(GameId::new()).await.unwrap());
    }
}
