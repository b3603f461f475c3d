//! Configuration loading for the Braze runtime.
//!
//! The schema lives in [`schema`], loading in [`loader`]. Configuration is
//! layered: built-in defaults, then `braze.toml`, then `BRAZE_*`
//! environment variables.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config};
pub use schema::{
    BrazeConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, LoginConfig,
};
