use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::types::BotStrategy;
use crate::game::{Game, GameService};
use crate::player::PlayerLookup;
use crate::shared::{AppError, GameId, PlayerId};

/// Pacing of simulated bot turns
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Shortest pause before a bot starts its turn
    pub think_delay_min: Duration,
    /// Longest pause before a bot starts its turn
    pub think_delay_max: Duration,
    /// Pause between darts of one turn
    pub dart_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            think_delay_min: Duration::from_millis(400),
            think_delay_max: Duration::from_millis(1200),
            dart_delay: Duration::from_millis(600),
        }
    }
}

impl SchedulerConfig {
    /// Reads `DARTS_BOT_THINK_MIN_MS`, `DARTS_BOT_THINK_MAX_MS` and
    /// `DARTS_BOT_DART_DELAY_MS`, falling back to the defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            think_delay_min: env_millis("DARTS_BOT_THINK_MIN_MS", defaults.think_delay_min),
            think_delay_max: env_millis("DARTS_BOT_THINK_MAX_MS", defaults.think_delay_max),
            dart_delay: env_millis("DARTS_BOT_DART_DELAY_MS", defaults.dart_delay),
        }
    }

    /// No pauses at all
    pub fn immediate() -> Self {
        Self {
            think_delay_min: Duration::ZERO,
            think_delay_max: Duration::ZERO,
            dart_delay: Duration::ZERO,
        }
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    match env::var(key) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(key, value = %raw, "Ignoring unparsable delay");
                default
            }
        },
        Err(_) => default,
    }
}

/// Handle for asking the worker to play a bot turn
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    sender: mpsc::UnboundedSender<GameId>,
}

impl TurnScheduler {
    /// Starts the single turn worker. It runs until `cancel` fires.
    pub fn spawn(
        game_service: Arc<GameService>,
        players: Arc<dyn PlayerLookup>,
        strategy: Arc<dyn BotStrategy>,
        config: SchedulerConfig,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = TurnWorker {
            receiver,
            game_service,
            players,
            strategy,
            config,
            cancel,
            rng: StdRng::from_os_rng(),
        };

        (Self { sender }, tokio::spawn(worker.run()))
    }

    /// Queues the current turn of `game_id`. Returns false once the worker has stopped.
    pub fn request_turn(&self, game_id: GameId) -> bool {
        self.sender.send(game_id).is_ok()
    }
}

struct TurnWorker {
    receiver: mpsc::UnboundedReceiver<GameId>,
    game_service: Arc<GameService>,
    players: Arc<dyn PlayerLookup>,
    strategy: Arc<dyn BotStrategy>,
    config: SchedulerConfig,
    cancel: CancellationToken,
    rng: StdRng,
}

impl TurnWorker {
    async fn run(mut self) {
        info!(
            strategy = self.strategy.strategy_name(),
            "Bot turn worker started"
        );

        loop {
            let game_id = tokio::select! {
                _ = self.cancel.cancelled() => break,
                next = self.receiver.recv() => match next {
                    Some(game_id) => game_id,
                    None => break,
                },
            };

            if let Err(e) = self.play_turn(game_id).await {
                warn!(game_id = %game_id, error = %e, "Bot turn failed");
            }
        }

        info!("Bot turn worker stopped");
    }

    /// Plays whatever is left of the current turn if it belongs to a bot
    #[instrument(skip(self))]
    async fn play_turn(&mut self, game_id: GameId) -> Result<(), AppError> {
        let think = self.think_delay();
        if !self.pause(think).await {
            return Ok(());
        }

        let game = self.game_service.get_game(game_id).await?;
        let Some(current) = game.current_player() else {
            debug!("Game is not in progress, skipping bot turn");
            return Ok(());
        };
        let bot_id = current.player_id;

        let profile = self.players.get_by_id(bot_id).await?;
        let Some(skill) = profile.bot_skill_level.filter(|_| profile.is_bot) else {
            debug!(player_id = %bot_id, "Current player is human, no bot action needed");
            return Ok(());
        };

        let Some(turn) = self.strategy.plan_turn(&game, skill) else {
            return Ok(());
        };

        let round = game.current_round();
        let mut dart_number = game.darts_in_turn() + 1;

        for (i, score) in turn.enumerate() {
            if i > 0 && !self.pause(self.config.dart_delay).await {
                return Ok(());
            }
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let latest = self.game_service.get_game(game_id).await?;
            if !still_throwing(&latest, bot_id, round, dart_number) {
                debug!(
                    player_id = %bot_id,
                    dart_number,
                    "Turn moved on under the bot, dropping remaining darts"
                );
                return Ok(());
            }

            let (record, updated) = self
                .game_service
                .register_throw(game_id, bot_id, score, dart_number)
                .await?;

            info!(
                player_id = %bot_id,
                username = %profile.username,
                score = %record.score,
                is_bust = record.is_bust,
                "Bot threw"
            );

            if !updated.is_in_progress() {
                if updated.winner_id() == Some(bot_id) {
                    info!(player_id = %bot_id, username = %profile.username, "Bot won the game!");
                }
                return Ok(());
            }
            dart_number += 1;
        }

        Ok(())
    }

    fn think_delay(&mut self) -> Duration {
        let min = self.config.think_delay_min;
        let max = self.config.think_delay_max;
        if max <= min {
            return min;
        }
        let extra = self.rng.random_range(0..=(max - min).as_millis() as u64);
        min + Duration::from_millis(extra)
    }

    /// Waits unless cancelled first. Returns false on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

/// Whether `player_id` is still on the dart the bot is about to throw
fn still_throwing(game: &Game, player_id: PlayerId, round: u32, dart_number: u8) -> bool {
    game.current_player()
        .is_some_and(|p| p.player_id == player_id)
        && game.current_round() == round
        && game.darts_in_turn() + 1 == dart_number
}
