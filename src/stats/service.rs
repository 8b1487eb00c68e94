use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument};

use crate::{
    event::{GameEvent, GameEventError, GameEventHandler},
    game::{DartThrowRecord, Game, GameService},
    rating::{find_best_match, MatchCandidate, MatchmakingConfig, SkillRating},
    shared::{AppError, PlayerId},
};

use super::{
    collector::summarize_game,
    models::{GameStatsReport, PlayerStatistics},
    repository::StatsRepository,
    StatsError,
};

pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
    // Games sharing a player would otherwise race on read-modify-write
    update_lock: AsyncMutex<()>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self {
            repository,
            update_lock: AsyncMutex::new(()),
        }
    }

    /// Folds a finished game into every participant's statistics and updates ratings,
    /// the winner playing each loser in turn order
    #[instrument(skip(self, game, throws), fields(game_id = %game.id()))]
    pub async fn process_completed_game(
        &self,
        game: &Game,
        throws: &[DartThrowRecord],
    ) -> Result<GameStatsReport, StatsError> {
        let summaries = summarize_game(game, throws)?;
        let winner_id = game
            .winner_id()
            .ok_or_else(|| StatsError::Validation(format!("game {} has no winner", game.id())))?;

        let _guard = self.update_lock.lock().await;

        if !self.repository.record_game(game.id()).await? {
            return Err(StatsError::AlreadyRecorded(game.id().to_string()));
        }

        // Ratings are seeded from history before this game is folded in
        let mut ratings: HashMap<PlayerId, SkillRating> = HashMap::new();
        for summary in &summaries {
            let rating = self.current_rating(summary.player_id).await?;
            ratings.insert(summary.player_id, rating);
        }

        for summary in &summaries {
            let before = self
                .repository
                .get_statistics(summary.player_id)
                .await?
                .unwrap_or_default();
            let after = summary.apply_to(before);
            self.repository
                .save_statistics(summary.player_id, after)
                .await?;

            debug!(
                player_id = %summary.player_id,
                games = after.total_games(),
                average = after.average_3_dart(),
                "Updated player statistics"
            );
        }

        let mut winner_rating = ratings
            .get(&winner_id)
            .copied()
            .unwrap_or_default();
        for loser in summaries.iter().filter(|s| s.player_id != winner_id) {
            let loser_rating = ratings.get(&loser.player_id).copied().unwrap_or_default();
            let (new_winner, new_loser) =
                SkillRating::calculate_new_ratings(&winner_rating, &loser_rating);
            winner_rating = new_winner;
            ratings.insert(loser.player_id, new_loser);
        }
        ratings.insert(winner_id, winner_rating);

        // A solo game has nobody to be rated against
        let mut updated_ratings = Vec::with_capacity(summaries.len());
        if summaries.len() > 1 {
            for summary in &summaries {
                if let Some(rating) = ratings.get(&summary.player_id).copied() {
                    self.repository
                        .save_rating(summary.player_id, rating)
                        .await?;
                    updated_ratings.push((summary.player_id, rating));
                }
            }
        }

        info!(
            winner_id = %winner_id,
            players = summaries.len(),
            winner_rating = winner_rating.rating(),
            "Recorded completed game"
        );

        Ok(GameStatsReport {
            game_id: game.id(),
            winner_id,
            summaries,
            ratings: updated_ratings,
        })
    }

    /// Statistics for a player, empty if they have never finished a game
    pub async fn get_player_statistics(
        &self,
        player_id: PlayerId,
    ) -> Result<PlayerStatistics, StatsError> {
        Ok(self
            .repository
            .get_statistics(player_id)
            .await?
            .unwrap_or_default())
    }

    /// Stored rating, else one inferred from history, else the default prior
    pub async fn current_rating(&self, player_id: PlayerId) -> Result<SkillRating, StatsError> {
        if let Some(rating) = self.repository.get_rating(player_id).await? {
            return Ok(rating);
        }

        let rating = match self.repository.get_statistics(player_id).await? {
            Some(stats) if stats.total_darts() > 0 => {
                SkillRating::from_three_dart_average(stats.average_3_dart(), stats.total_games())
            }
            _ => SkillRating::default(),
        };
        Ok(rating)
    }

    /// Best-rated opponent for `player_id` among `candidates`
    pub async fn find_opponent(
        &self,
        player_id: PlayerId,
        candidates: &[PlayerId],
        config: &MatchmakingConfig,
    ) -> Result<Option<PlayerId>, StatsError> {
        let player = MatchCandidate {
            player_id,
            rating: self.current_rating(player_id).await?,
        };

        let mut pool = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            pool.push(MatchCandidate {
                player_id: *candidate,
                rating: self.current_rating(*candidate).await?,
            });
        }

        Ok(find_best_match(&player, &pool, config).map(|c| c.player_id))
    }
}

/// Event subscriber that records statistics for finished games
pub struct StatsGameSubscriber {
    stats_service: Arc<StatsService>,
    game_service: Arc<GameService>,
}

impl StatsGameSubscriber {
    pub fn new(stats_service: Arc<StatsService>, game_service: Arc<GameService>) -> Self {
        Self {
            stats_service,
            game_service,
        }
    }
}

#[async_trait::async_trait]
impl GameEventHandler for StatsGameSubscriber {
    async fn handle_event(&self, event: &GameEvent) -> Result<(), GameEventError> {
        if let GameEvent::GameWon { game_id, .. } = event {
            let game = self.game_service.get_game(*game_id).await.map_err(|e| match e {
                AppError::NotFound(msg) => GameEventError::GameNotFound(msg),
                other => GameEventError::HandlerError(other.to_string()),
            })?;
            let throws = self
                .game_service
                .get_throws(*game_id)
                .await
                .map_err(|e| GameEventError::HandlerError(e.to_string()))?;

            match self.stats_service.process_completed_game(&game, &throws).await {
                Ok(_) => {}
                Err(StatsError::AlreadyRecorded(_)) => {
                    debug!(game_id = %game_id, "Game already recorded, skipping");
                }
                Err(err) => {
                    tracing::error!(
                        ?err,
                        game_id = %game_id,
                        "Failed to process game completion for stats"
                    );
                    return Err(GameEventError::HandlerError(err.to_string()));
                }
            }
        }

        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "StatsGameSubscriber"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::EventBus,
        game::{GameType, InMemoryGameRepository, InMode, Multiplier, OutMode, Score},
        player::InMemoryPlayerDirectory,
        stats::InMemoryStatsRepository,
    };

    fn score(segment: u8, multiplier: Multiplier) -> Score {
        Score::new(segment, multiplier).unwrap()
    }

    /// Alice hits D20 from 40 before Bob throws
    fn finished_game(alice: PlayerId, bob: PlayerId) -> (Game, Vec<DartThrowRecord>) {
        let game = Game::new(GameType::Custom, 40, InMode::StraightIn, OutMode::DoubleOut).unwrap();
        let (game, _) = game.add_player(alice).unwrap();
        let (game, _) = game.add_player(bob).unwrap();
        let (game, _) = game.start().unwrap();
        let outcome = game
            .register_throw(alice, score(20, Multiplier::Double), 1)
            .unwrap();
        (outcome.game, vec![outcome.record])
    }

    #[tokio::test]
    async fn process_completed_game_updates_statistics_and_ratings() {
        let service = StatsService::new(Arc::new(InMemoryStatsRepository::new()));
        let alice = PlayerId::new();
        let bob = PlayerId::new();
        let (game, throws) = finished_game(alice, bob);

        let report = service.process_completed_game(&game, &throws).await.unwrap();
        assert_eq!(report.winner_id, alice);
        assert_eq!(report.summaries.len(), 2);

        let alice_stats = service.get_player_statistics(alice).await.unwrap();
        assert_eq!(alice_stats.wins(), 1);
        assert_eq!(alice_stats.highest_checkout(), 40);
        let bob_stats = service.get_player_statistics(bob).await.unwrap();
        assert_eq!(bob_stats.total_games(), 1);
        assert_eq!(bob_stats.wins(), 0);

        let alice_rating = service.current_rating(alice).await.unwrap();
        let bob_rating = service.current_rating(bob).await.unwrap();
        assert!(alice_rating.rating() > 1200.0);
        assert!(bob_rating.rating() < 1200.0);
        assert_eq!(alice_rating.games_played(), 1);
    }

    #[tokio::test]
    async fn the_same_game_is_only_counted_once() {
        let service = StatsService::new(Arc::new(InMemoryStatsRepository::new()));
        let alice = PlayerId::new();
        let (game, throws) = finished_game(alice, PlayerId::new());

        service.process_completed_game(&game, &throws).await.unwrap();
        let second = service.process_completed_game(&game, &throws).await;

        assert!(matches!(second, Err(StatsError::AlreadyRecorded(_))));
        assert_eq!(
            service.get_player_statistics(alice).await.unwrap().total_games(),
            1
        );
    }

    #[tokio::test]
    async fn unrated_players_with_history_are_seeded_from_their_average() {
        let repo = Arc::new(InMemoryStatsRepository::new());
        let service = StatsService::new(repo.clone());
        let veteran = PlayerId::new();

        // 60 points per dart is a 180 average
        let history = PlayerStatistics::empty().with_game(true, 30, 1800, None);
        repo.save_statistics(veteran, history).await.unwrap();

        let rating = service.current_rating(veteran).await.unwrap();
        assert_eq!(
            rating,
            SkillRating::from_three_dart_average(180.0, 1)
        );
        assert_eq!(
            service.current_rating(PlayerId::new()).await.unwrap(),
            SkillRating::default()
        );
    }

    #[tokio::test]
    async fn find_opponent_prefers_closest_rating() {
        let repo = Arc::new(InMemoryStatsRepository::new());
        let service = StatsService::new(repo.clone());
        let me = PlayerId::new();
        let near = PlayerId::new();
        let far = PlayerId::new();

        repo.save_rating(me, SkillRating::new(1500.0, 50.0, 100)).await.unwrap();
        repo.save_rating(near, SkillRating::new(1550.0, 50.0, 100)).await.unwrap();
        repo.save_rating(far, SkillRating::new(2500.0, 50.0, 100)).await.unwrap();

        let matched = service
            .find_opponent(me, &[far, near], &MatchmakingConfig::default())
            .await
            .unwrap();
        assert_eq!(matched, Some(near));
    }

    #[tokio::test]
    async fn subscriber_records_games_on_game_won() {
        let directory = Arc::new(InMemoryPlayerDirectory::new());
        let game_service = Arc::new(GameService::new(
            Arc::new(InMemoryGameRepository::new()),
            directory.clone(),
            EventBus::new(),
        ));
        let stats_service = Arc::new(StatsService::new(Arc::new(InMemoryStatsRepository::new())));
        let subscriber = StatsGameSubscriber::new(stats_service.clone(), game_service.clone());

        let alice = directory.register_human("alice").await;
        let game = game_service
            .create_game(GameType::Custom, 40, InMode::StraightIn, OutMode::DoubleOut)
            .await
            .unwrap();
        game_service.add_player(game.id(), alice.id).await.unwrap();
        game_service.start_game(game.id()).await.unwrap();
        game_service
            .submit_throw(game.id(), alice.id, 20, 2, 1)
            .await
            .unwrap();

        let finished = game_service.get_game(game.id()).await.unwrap();
        subscriber
            .handle_event(&GameEvent::GameWon {
                game_id: game.id(),
                game_type: GameType::Custom,
                winner: alice.id,
                checkout: 40,
                darts_thrown: 1,
                timestamp: finished.finished_at().unwrap(),
            })
            .await
            .unwrap();

        let stats = stats_service.get_player_statistics(alice.id).await.unwrap();
        assert_eq!(stats.wins(), 1);
        assert_eq!(stats.highest_checkout(), 40);

        // A repeated event is not an error
        subscriber
            .handle_event(&GameEvent::GameWon {
                game_id: game.id(),
                game_type: GameType::Custom,
                winner: alice.id,
                checkout: 40,
                darts_thrown: 1,
                timestamp: finished.finished_at().unwrap(),
            })
            .await
            .unwrap();
    }
}
