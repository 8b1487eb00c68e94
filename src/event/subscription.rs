use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{bus::EventBus, handler::GameEventHandler};

/// Routes every event on the bus to one handler
pub struct EventSubscription {
    handler: Arc<dyn GameEventHandler>,
    event_bus: EventBus,
}

impl EventSubscription {
    pub fn new(handler: Arc<dyn GameEventHandler>, event_bus: EventBus) -> Self {
        Self { handler, event_bus }
    }

    /// Spawns a background task that feeds events to the handler until `cancel` fires.
    ///
    /// The receiver is created before this returns, so no event emitted afterwards is missed.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        let handler_name = self.handler.handler_name();
        let mut receiver = self.event_bus.subscribe();

        info!(handler = handler_name, "Starting event subscription");

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = receiver.recv() => received,
                };

                match received {
                    Ok(event) => {
                        debug!(
                            handler = handler_name,
                            game_id = %event.game_id(),
                            event_type = event.event_type(),
                            "Received game event"
                        );

                        if let Err(e) = self.handler.handle_event(&event).await {
                            warn!(
                                handler = handler_name,
                                game_id = %event.game_id(),
                                error = %e,
                                "Game event handler failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(handler = handler_name, skipped, "Subscription lagged, events skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            info!(handler = handler_name, "Event subscription ended");
        })
    }
}
