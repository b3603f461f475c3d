//! Runtime orchestration.
//!
//! The runtime ties configuration, logging and the bot lifecycle together:
//! load a [`BrazeConfig`], initialize logging from it, log in through a
//! chat client, and run the event loop until it ends or a shutdown signal
//! arrives.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use braze_runtime::BrazeRuntime;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Auto-loads braze.toml from the current directory
//!     let runtime = BrazeRuntime::new();
//!
//!     let client = Arc::new(MyChatClient::default());
//!     let bot = runtime.login(client).await?;
//!
//!     bot.rule("^ping$").handler(|_ctx| async { "pong" })?;
//!
//!     runtime.run(&bot).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};

use braze_core::{Bot, BoxedClient, LoginOptions};

use crate::config::{BrazeConfig, load_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Config-driven orchestration for a Braze bot.
pub struct BrazeRuntime {
    /// The loaded configuration.
    config: BrazeConfig,
}

impl BrazeRuntime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Searches for `braze.toml` in the current directory, applies
    /// `BRAZE_*` environment overrides and initializes logging. Falls back
    /// to defaults when no configuration is found.
    pub fn new() -> Self {
        let config = load_config().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config ({e}), using defaults");
            BrazeConfig::default()
        });

        Self::from_config(&config)
    }

    /// Creates a runtime from a pre-loaded configuration.
    ///
    /// Initializes logging from the configuration; only the first
    /// initialization in the process takes effect.
    pub fn from_config(config: &BrazeConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &BrazeConfig {
        &self.config
    }

    /// Returns the login options derived from configuration.
    pub fn login_options(&self) -> LoginOptions {
        self.config.login.to_login_options()
    }

    /// Returns the configured handler timeout, if any.
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.config.dispatch.handler_timeout()
    }

    /// Logs in through `client` with the configured options.
    pub async fn login(&self, client: BoxedClient) -> RuntimeResult<Arc<Bot>> {
        let options = self.login_options();
        let bot = match self.handler_timeout() {
            Some(limit) => Bot::login_with_timeout(client, options, limit).await?,
            None => Bot::login(client, options).await?,
        };
        Ok(bot)
    }

    /// Runs the bot's event loop until it ends or ctrl-c arrives.
    pub async fn run(&self, bot: &Arc<Bot>) -> RuntimeResult<()> {
        tokio::select! {
            result = Arc::clone(bot).run() => {
                result?;
                info!("event loop ended");
            }
            signal = signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "failed to listen for shutdown signal");
                } else {
                    info!("shutdown signal received");
                }
            }
        }
        Ok(())
    }
}

impl Default for BrazeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BrazeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrazeRuntime")
            .field("config", &self.config)
            .finish()
    }
}
