//! Unified error types for the Braze dispatch core.
//!
//! Registration errors are loud: a malformed pattern fails at registration
//! time, never at first match. Everything that happens during dispatch is
//! recovered locally so one rule or one event can never poison another.

use thiserror::Error;

use crate::foundation::reply::Reply;

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors that can occur while registering rules.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The rule pattern is not a valid regular expression.
    #[error("invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as passed to registration.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: Box<regex::Error>,
    },
}

// =============================================================================
// Handler Errors
// =============================================================================

/// Errors a rule handler can hand back to the dispatcher.
///
/// A handler error is recovered at the dispatch boundary: it is logged, no
/// outbound action is produced, and the remaining matched rules still run.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The handler produced a result the dispatcher cannot interpret.
    #[error("malformed handler reply: {0}")]
    Contract(String),

    /// Any other failure inside the handler.
    #[error("handler failed: {0}")]
    Other(String),
}

impl HandlerError {
    /// Wraps an arbitrary handler failure.
    pub fn other(err: impl std::fmt::Display) -> Self {
        Self::Other(err.to_string())
    }
}

// =============================================================================
// Client Errors
// =============================================================================

/// Errors reported by the chat client collaborator.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Login or session establishment failed.
    #[error("login failed: {0}")]
    Login(String),

    /// A contact directory lookup failed.
    #[error("contact lookup failed for '{id}': {reason}")]
    Lookup {
        /// The identifier that was looked up.
        id: String,
        /// Reason for failure.
        reason: String,
    },

    /// An outbound send was not delivered.
    #[error("failed to send message: {0}")]
    Send(String),

    /// The event intake loop terminated abnormally.
    #[error("event loop terminated: {0}")]
    EventLoop(String),

    /// Persisted session state could not be read or written.
    #[error("session storage error: {0}")]
    Session(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Bot Errors
// =============================================================================

/// Errors surfaced by the bot façade.
#[derive(Debug, Error)]
pub enum BotError {
    /// Rule registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The chat client reported a failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for rule handlers.
pub type HandlerResult = Result<Reply, HandlerError>;

/// Result type for chat client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for bot façade operations.
pub type BotResult<T> = Result<T, BotError>;
