//! Braze Runtime - Orchestration layer for the Braze chat bot framework.
//!
//! This crate provides:
//! - Configuration loading (`braze.toml` + `BRAZE_*` environment overrides)
//! - Logging setup (`tracing` / `tracing-subscriber`, optional file output)
//! - Runtime orchestration with signal-based shutdown (`BrazeRuntime`)
//!
//! ```ignore
//! use braze_runtime::BrazeRuntime;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = BrazeRuntime::new();
//!     let bot = runtime.login(Arc::new(my_client)).await?;
//!
//!     bot.rule("^ping$").handler(|_ctx| async { "pong" })?;
//!
//!     runtime.run(&bot).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{BrazeConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig, LoginConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::BrazeRuntime;

// Re-export tracing for use by downstream crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
