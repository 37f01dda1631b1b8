//! Server settings.
//!
//! Sources are layered, later ones winning: built-in defaults, an optional
//! JSON file, `SIMPLE_CHAT_*` environment variables, then the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Args;
use crate::server::DEFAULT_PORT;

/// Everything the server binary can be configured with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub logging: LoggingSection,
}

/// `"server"` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Port the listener binds on `#start` and at boot.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// `"logging"` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Bare level or a full `EnvFilter` directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Read a JSON file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Overlay `SIMPLE_CHAT_PORT` and `SIMPLE_CHAT_LOG_LEVEL` (or `RUST_LOG`).
    ///
    /// An unparsable port is ignored.
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("SIMPLE_CHAT_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(level) = std::env::var("SIMPLE_CHAT_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Overlay whatever was given on the command line.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Build the effective configuration for a run.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Filter handed to [`crate::logging::init_with_filter`].
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Failure to load the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[source] serde_json::Error),
}
