use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::GameEvent;
use crate::shared::GameId;

const CHANNEL_CAPACITY: usize = 256;

/// Event bus for distributing game events throughout the application.
///
/// Every event goes to the global channel; per-game channels exist only for
/// games somebody subscribed to.
#[derive(Debug, Clone)]
pub struct EventBus {
    global: broadcast::Sender<GameEvent>,
    game_channels: Arc<RwLock<HashMap<GameId, broadcast::Sender<GameEvent>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (global, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            global,
            game_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publishes an event. Fire-and-forget: having no receivers is not an error.
    pub async fn emit(&self, event: GameEvent) {
        let game_id = event.game_id();
        let event_type = event.event_type();

        {
            let game_channels = self.game_channels.read().await;
            if let Some(sender) = game_channels.get(&game_id) {
                let _ = sender.send(event.clone());
            }
        }

        match self.global.send(event) {
            Ok(receiver_count) => {
                debug!(
                    game_id = %game_id,
                    event_type,
                    receivers = receiver_count,
                    "Game event emitted"
                );
            }
            Err(_) => {
                debug!(game_id = %game_id, event_type, "Game event emitted with no receivers");
            }
        }
    }

    /// Subscribe to the events of every game
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.global.subscribe()
    }

    /// Subscribe to the events of a single game
    pub async fn subscribe_to_game(&self, game_id: GameId) -> broadcast::Receiver<GameEvent> {
        let game_channels = self.game_channels.read().await;

        if let Some(sender) = game_channels.get(&game_id) {
            sender.subscribe()
        } else {
            debug!(game_id = %game_id, "Creating new game channel for subscription");
            drop(game_channels);

            let mut game_channels = self.game_channels.write().await;
            game_channels
                .entry(game_id)
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        }
    }

    /// Drops the per-game channel; its receivers see the channel close
    pub async fn close_game(&self, game_id: GameId) {
        let mut game_channels = self.game_channels.write().await;
        if game_channels.remove(&game_id).is_some() {
            debug!(game_id = %game_id, "Closed game channel");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameType;
    use chrono::Utc;

    fn created(game_id: GameId) -> GameEvent {
        GameEvent::GameCreated {
            game_id,
            game_type: GameType::Standard501,
            starting_score: 501,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn global_subscribers_see_every_game() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let first = GameId::new();
        let second = GameId::new();

        bus.emit(created(first)).await;
        bus.emit(created(second)).await;

        assert_eq!(rx.recv().await.unwrap().game_id(), first);
        assert_eq!(rx.recv().await.unwrap().game_id(), second);
    }

    #[tokio::test]
    async fn game_subscribers_only_see_their_game() {
        let bus = EventBus::new();
        let watched = GameId::new();
        let mut rx = bus.subscribe_to_game(watched).await;

        bus.emit(created(GameId::new())).await;
        bus.emit(created(watched)).await;

        assert_eq!(rx.recv().await.unwrap().game_id(), watched);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn emitting_without_receivers_is_fine() {
        let bus = EventBus::new();
        bus.emit(created(GameId::new())).await;
    }

    #[tokio::test]
    async fn closing_a_game_closes_its_channel() {
        let bus = EventBus::new();
        let game_id = GameId::new();
        let mut rx = bus.subscribe_to_game(game_id).await;

        bus.close_game(game_id).await;
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
