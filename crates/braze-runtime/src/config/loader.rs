//! Configuration loader using figment.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. The TOML config file (`braze.toml` in the current directory, or an
//!    explicitly given path)
//! 3. Environment variables (`BRAZE_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `BRAZE_` prefix with `__` as the section
//! separator:
//!
//! - `BRAZE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `BRAZE_LOGIN__HOT_RELOAD=true` → `login.hot_reload = true`
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_runtime::config::ConfigLoader;
//!
//! // Default locations plus environment overrides
//! let config = ConfigLoader::new().load()?;
//!
//! // Explicit file
//! let config = ConfigLoader::new().file("config/braze.toml").load()?;
//! ```

use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::schema::BrazeConfig;

/// Default config file searched in the current directory.
const DEFAULT_CONFIG_FILE: &str = "braze.toml";

/// Environment variable prefix.
const ENV_PREFIX: &str = "BRAZE_";

/// Configuration loader with figment-based layering.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Specific config file to load instead of the default search.
    config_file: Option<PathBuf>,
    /// Whether to skip the environment layer.
    skip_env: bool,
}

impl ConfigLoader {
    /// Creates a loader with the default source stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads from a specific file.
    ///
    /// Unlike the default search, an explicitly named file must exist.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Skips the `BRAZE_*` environment layer.
    pub fn without_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads and extracts the configuration.
    pub fn load(&self) -> ConfigResult<BrazeConfig> {
        let mut figment = Figment::from(Serialized::defaults(BrazeConfig::default()));

        match &self.config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound(path.clone()));
                }
                figment = figment.merge(Toml::file(path));
            }
            // The default file is optional; figment treats a missing file
            // as an empty source.
            None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        }

        if !self.skip_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        let config: BrazeConfig = figment.extract()?;
        debug!("configuration loaded");
        Ok(config)
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<BrazeConfig> {
    ConfigLoader::new().load()
}
