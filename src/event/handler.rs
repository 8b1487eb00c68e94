use async_trait::async_trait;
use thiserror::Error;

use super::events::GameEvent;

/// Errors that can occur when handling game events
#[derive(Debug, Error)]
pub enum GameEventError {
    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that react to game events
///
/// Handlers should be idempotent where possible - the bus gives no
/// exactly-once guarantee.
#[async_trait]
pub trait GameEventHandler: Send + Sync {
    async fn handle_event(&self, event: &GameEvent) -> Result<(), GameEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
