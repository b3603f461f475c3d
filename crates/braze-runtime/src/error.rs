//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use braze_core::BotError;

/// Errors surfaced by the runtime orchestration layer.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bot façade reported a failure.
    #[error(transparent)]
    Bot(#[from] BotError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
