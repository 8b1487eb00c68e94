use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    event::{GameEvent, GameEventError, GameEventHandler},
    player::PlayerLookup,
    shared::{GameId, PlayerId},
};

use super::scheduler::TurnScheduler;

/// Event subscriber that hands bot turns to the scheduler
pub struct BotGameSubscriber {
    scheduler: TurnScheduler,
    players: Arc<dyn PlayerLookup>,
}

impl BotGameSubscriber {
    pub fn new(scheduler: TurnScheduler, players: Arc<dyn PlayerLookup>) -> Self {
        Self { scheduler, players }
    }

    /// Check if the player to throw is a bot and queue its turn
    async fn handle_turn_started(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<(), GameEventError> {
        let profile = self
            .players
            .get_by_id(player_id)
            .await
            .map_err(|e| GameEventError::HandlerError(e.to_string()))?;

        if !profile.is_bot {
            debug!(
                game_id = %game_id,
                player_id = %player_id,
                "Turn passed to human player, no bot action needed"
            );
            return Ok(());
        }

        info!(
            game_id = %game_id,
            player_id = %player_id,
            username = %profile.username,
            "Bot's turn detected, scheduling throws"
        );

        if !self.scheduler.request_turn(game_id) {
            warn!(game_id = %game_id, "Bot turn worker is not running");
        }
        Ok(())
    }
}

#[async_trait]
impl GameEventHandler for BotGameSubscriber {
    async fn handle_event(&self, event: &GameEvent) -> Result<(), GameEventError> {
        if let Some(player_id) = event.player_to_throw() {
            return self.handle_turn_started(event.game_id(), player_id).await;
        }
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "BotGameSubscriber"
    }
}
