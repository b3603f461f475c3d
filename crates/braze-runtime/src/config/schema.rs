//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use braze_core::LoginOptions;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrazeConfig {
    /// Session establishment settings handed to the chat client.
    #[serde(default)]
    pub login: LoginConfig,

    /// Dispatch behavior settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session establishment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Reuse a persisted session instead of performing a fresh login.
    #[serde(default)]
    pub hot_reload: bool,

    /// Where the persisted session is stored.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Render the login QR code on the terminal instead of a picture file.
    #[serde(default)]
    pub headless_qr: bool,

    /// Directory to drop the QR picture into, when not headless.
    #[serde(default)]
    pub qr_dir: Option<PathBuf>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            hot_reload: false,
            session_file: default_session_file(),
            headless_qr: false,
            qr_dir: None,
        }
    }
}

impl LoginConfig {
    /// Converts to core login options.
    ///
    /// Lifecycle hooks are code, not configuration; they stay `None` here
    /// and can be attached by the caller afterwards.
    pub fn to_login_options(&self) -> LoginOptions {
        LoginOptions {
            hot_reload: self.hot_reload,
            session_file: self.session_file.clone(),
            headless_qr: self.headless_qr,
            qr_dir: self.qr_dir.clone(),
            ..LoginOptions::default()
        }
    }
}

fn default_session_file() -> PathBuf {
    PathBuf::from("braze-session.json")
}

/// Dispatch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DispatchConfig {
    /// Upper bound on a single handler's run time, in milliseconds.
    ///
    /// Unset means handlers are not bounded.
    #[serde(default)]
    pub handler_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    /// Returns the handler timeout as a duration.
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level (default).
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output (default).
    #[default]
    Compact,
    /// Full default formatter output.
    Full,
    /// Multi-line human-oriented output.
    Pretty,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output (default).
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A log file; requires `file_path`.
    File,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Include thread ids in log output.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers in log output.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `braze_core = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}
