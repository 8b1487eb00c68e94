use std::sync::Arc;
use std::time::Duration;

use darts::{
    bot::{BotStrategy, SchedulerConfig, SkillBasedStrategy, SkillLevel, TurnScheduler},
    game::{Game, GameType, InMemoryGameRepository, InMode, OutMode},
    player::{InMemoryPlayerDirectory, PlayerProfile},
    shared::{AppState, GameId},
    stats::InMemoryStatsRepository,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app_state: AppState,
    #[allow(dead_code)]
    pub directory: Arc<InMemoryPlayerDirectory>,
    pub players: Vec<PlayerProfile>,
    #[allow(dead_code)]
    pub scheduler: TurnScheduler,
    pub cancel: CancellationToken,
    pub handles: Vec<JoinHandle<()>>,
}

enum Seat {
    Human(String),
    Bot(SkillLevel),
}

pub struct TestSetupBuilder {
    seats: Vec<Seat>,
    seed: u64,
    config: SchedulerConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            seats: vec![],
            seed: 42,
            config: SchedulerConfig::immediate(),
        }
    }

    pub fn with_human(mut self, username: &str) -> Self {
        self.seats.push(Seat::Human(username.to_string()));
        self
    }

    pub fn with_bot(mut self, skill: u8) -> Self {
        self.seats.push(Seat::Bot(SkillLevel::new(skill)));
        self
    }

    pub fn with_two_bots(self) -> Self {
        self.with_bot(90).with_bot(60)
    }

    #[allow(dead_code)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub async fn build(self) -> TestSetup {
        let directory = Arc::new(InMemoryPlayerDirectory::new());
        let app_state = AppState::new(
            directory.clone(),
            Arc::new(InMemoryGameRepository::new()),
            Arc::new(InMemoryStatsRepository::new()),
        );

        let mut players = Vec::with_capacity(self.seats.len());
        for seat in self.seats {
            let profile = match seat {
                Seat::Human(name) => directory.register_human(name).await,
                Seat::Bot(skill) => directory.register_bot(skill).await,
            };
            players.push(profile);
        }

        let strategy: Arc<dyn BotStrategy> = Arc::new(SkillBasedStrategy::new(Some(self.seed)));
        let cancel = CancellationToken::new();
        let tasks = app_state.start_background_tasks(strategy, self.config, cancel.clone());

        TestSetup {
            app_state,
            directory,
            players,
            scheduler: tasks.scheduler,
            cancel,
            handles: tasks.handles,
        }
    }
}

impl TestSetup {
    /// Creates a game with every seated player, in seating order, and starts it
    pub async fn start_game(&self, starting_score: u32, in_mode: InMode, out_mode: OutMode) -> Game {
        let service = &self.app_state.game_service;
        let game = service
            .create_game(GameType::Custom, starting_score, in_mode, out_mode)
            .await
            .unwrap();
        for player in &self.players {
            service.add_player(game.id(), player.id).await.unwrap();
        }
        service.start_game(game.id()).await.unwrap()
    }

    /// Polls the stored game until `done` holds
    pub async fn wait_for<F>(&self, game_id: GameId, timeout: Duration, mut done: F) -> Game
    where
        F: FnMut(&Game) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let game = self.app_state.game_service.get_game(game_id).await.unwrap();
            if done(&game) {
                return game;
            }
            if tokio::time::Instant::now() >= deadline {
                panic!("game {} did not reach the expected state in time", game_id);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            handle.await.unwrap();
        }
    }
}
