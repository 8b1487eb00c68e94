use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::{
    commands::{CommandOutcome, GameCommand},
    core::{DartThrowRecord, Game, GameError, GameType, InMode, OutMode},
    repository::GameRepository,
    score::{Multiplier, Score},
};
use crate::{
    event::{EventBus, GameEvent},
    player::PlayerLookup,
    shared::{AppError, GameId, PlayerId},
};

/// What a transition produced, before it is persisted and published
struct Applied<T> {
    game: Game,
    events: Vec<GameEvent>,
    record: Option<DartThrowRecord>,
    output: T,
}

/// Per-game lock plus when it was last taken
struct GameSlot {
    lock: Arc<AsyncMutex<()>>,
    last_used: Instant,
}

/// Owns every mutation of live games.
///
/// Mutations of one game are serialized through a per-game lock; different
/// games never wait on each other.
pub struct GameService {
    repository: Arc<dyn GameRepository>,
    players: Arc<dyn PlayerLookup>,
    event_bus: EventBus,
    game_locks: Arc<RwLock<HashMap<GameId, GameSlot>>>,
}

impl GameService {
    pub fn new(
        repository: Arc<dyn GameRepository>,
        players: Arc<dyn PlayerLookup>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            repository,
            players,
            event_bus,
            game_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Explicit command dispatch for callers that receive commands as data
    pub async fn execute(&self, command: GameCommand) -> Result<CommandOutcome, AppError> {
        match command {
            GameCommand::CreateGame {
                game_type,
                starting_score,
                in_mode,
                out_mode,
            } => self
                .create_game(game_type, starting_score, in_mode, out_mode)
                .await
                .map(CommandOutcome::GameCreated),
            GameCommand::AddPlayer { game_id, player_id } => self
                .add_player(game_id, player_id)
                .await
                .map(CommandOutcome::PlayerAdded),
            GameCommand::StartGame { game_id } => self
                .start_game(game_id)
                .await
                .map(CommandOutcome::GameStarted),
            GameCommand::SubmitThrow {
                game_id,
                player_id,
                segment,
                multiplier,
                dart_number,
            } => self
                .submit_throw(game_id, player_id, segment, multiplier, dart_number)
                .await
                .map(CommandOutcome::ThrowRegistered),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_game(
        &self,
        game_type: GameType,
        starting_score: u32,
        in_mode: InMode,
        out_mode: OutMode,
    ) -> Result<Game, AppError> {
        let game = Game::new(game_type, starting_score, in_mode, out_mode)?;
        self.repository.save(&game).await?;
        self.game_lock(game.id()).await;

        info!(game_id = %game.id(), "Created game");

        self.event_bus
            .emit(GameEvent::GameCreated {
                game_id: game.id(),
                game_type,
                starting_score,
                timestamp: game.created_at(),
            })
            .await;

        Ok(game)
    }

    #[instrument(skip(self))]
    pub async fn add_player(&self, game_id: GameId, player_id: PlayerId) -> Result<Game, AppError> {
        let profile = self.players.get_by_id(player_id).await?;

        let game = self
            .apply(game_id, |game| {
                let (next, events) = game.add_player(player_id)?;
                Ok(Applied {
                    output: next.clone(),
                    game: next,
                    events,
                    record: None,
                })
            })
            .await?;

        info!(
            game_id = %game_id,
            player_id = %player_id,
            username = %profile.username,
            is_bot = profile.is_bot,
            "Player joined game"
        );
        Ok(game)
    }

    #[instrument(skip(self))]
    pub async fn start_game(&self, game_id: GameId) -> Result<Game, AppError> {
        let game = self
            .apply(game_id, |game| {
                let (next, events) = game.start()?;
                Ok(Applied {
                    output: next.clone(),
                    game: next,
                    events,
                    record: None,
                })
            })
            .await?;

        info!(game_id = %game_id, players = game.players().len(), "Game started");
        Ok(game)
    }

    /// Command-submission entry point taking raw board coordinates
    pub async fn submit_throw(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        segment: u8,
        multiplier: u8,
        dart_number: u8,
    ) -> Result<DartThrowRecord, AppError> {
        let multiplier = Multiplier::try_from(multiplier)?;
        let score = Score::new(segment, multiplier)?;
        self.register_throw(game_id, player_id, score, dart_number)
            .await
            .map(|(record, _)| record)
    }

    /// Registers one dart and returns the record together with the updated game
    #[instrument(skip(self, score), fields(score = %score))]
    pub async fn register_throw(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        score: Score,
        dart_number: u8,
    ) -> Result<(DartThrowRecord, Game), AppError> {
        let (record, game) = self
            .apply(game_id, |game| {
                let outcome = game.register_throw(player_id, score, dart_number)?;
                Ok(Applied {
                    output: (outcome.record.clone(), outcome.game.clone()),
                    game: outcome.game,
                    events: outcome.events,
                    record: Some(outcome.record),
                })
            })
            .await?;

        let remaining = game.player(player_id).map(|p| p.current_score);
        debug!(
            game_id = %game_id,
            player_id = %player_id,
            dart_number,
            is_bust = record.is_bust,
            remaining = ?remaining,
            "Throw registered"
        );

        if !game.is_in_progress() {
            info!(game_id = %game_id, winner = ?game.winner_id(), "Game finished");
            self.release_game(game_id).await;
        }

        Ok((record, game))
    }

    pub async fn get_game(&self, game_id: GameId) -> Result<Game, AppError> {
        self.repository
            .get_by_id(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game not found: {}", game_id)))
    }

    pub async fn get_throws(&self, game_id: GameId) -> Result<Vec<DartThrowRecord>, AppError> {
        self.repository.throws_for_game(game_id).await
    }

    /// Loads, transitions, persists and publishes under the game's lock.
    /// A rejected transition leaves the stored game untouched.
    async fn apply<T, F>(&self, game_id: GameId, transition: F) -> Result<T, AppError>
    where
        F: FnOnce(&Game) -> Result<Applied<T>, GameError>,
    {
        let lock = self.game_lock(game_id).await;
        let _guard = lock.lock().await;

        let game = self.get_game(game_id).await?;
        let applied = transition(&game)?;

        self.repository.save(&applied.game).await?;
        if let Some(record) = &applied.record {
            self.repository.append_throw(record).await?;
        }
        for event in applied.events {
            self.event_bus.emit(event).await;
        }

        Ok(applied.output)
    }

    async fn game_lock(&self, game_id: GameId) -> Arc<AsyncMutex<()>> {
        let mut guard = self.game_locks.write().await;
        let slot = guard.entry(game_id).or_insert_with(|| GameSlot {
            lock: Arc::new(AsyncMutex::new(())),
            last_used: Instant::now(),
        });
        slot.last_used = Instant::now();
        slot.lock.clone()
    }

    /// Drops the lock and event channel of every game untouched for `idle_for`.
    /// A game whose lock is held or awaited is kept. A released game that is used
    /// again simply gets a fresh lock.
    #[instrument(skip(self))]
    pub async fn release_idle_games(&self, idle_for: Duration) -> Vec<GameId> {
        let released: Vec<GameId> = {
            let mut guard = self.game_locks.write().await;
            let idle: Vec<GameId> = guard
                .iter()
                .filter(|(_, slot)| {
                    Arc::strong_count(&slot.lock) == 1 && slot.last_used.elapsed() >= idle_for
                })
                .map(|(game_id, _)| *game_id)
                .collect();
            for game_id in &idle {
                guard.remove(game_id);
            }
            idle
        };

        for game_id in &released {
            self.event_bus.close_game(*game_id).await;
            debug!(game_id = %game_id, "Released idle game");
        }
        released
    }

    async fn release_game(&self, game_id: GameId) {
        self.game_locks.write().await.remove(&game_id);
        self.event_bus.close_game(game_id).await;
    }
}
