use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Repository error: {0}")]
    #[allow(dead_code)] // Error variant for persistent repository failures
    Repository(String),

    #[error("Game already recorded: {0}")]
    AlreadyRecorded(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
