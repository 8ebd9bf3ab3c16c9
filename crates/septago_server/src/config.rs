//! Server configuration.
//!
//! Precedence, lowest to highest: built-in defaults, `septago.toml`,
//! environment (`SEPTAGO_HOST`, `SEPTAGO_PORT`, `SEPTAGO_PUZZLE_DIR`, also
//! read from `.env`), command-line flags.

use crate::error::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "septago.toml";

/// Settings for the HTTP server and puzzle lookup.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// Directory holding `*.json` puzzle files.
    puzzle_dir: PathBuf,

    /// Tracing filter used when `RUST_LOG` is unset.
    log_filter: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            puzzle_dir: PathBuf::from("puzzles"),
            log_filter: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `SEPTAGO_*` overrides from the process environment.
    pub fn with_process_env(self) -> Result<Self, ConfigError> {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Applies `SEPTAGO_*` overrides from `lookup`.
    #[instrument(skip_all)]
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("SEPTAGO_HOST") {
            debug!(%host, "Host overridden by environment");
            self.host = host;
        }
        if let Some(port) = lookup("SEPTAGO_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid SEPTAGO_PORT {:?}: {}", port, e)))?;
            debug!(port = self.port, "Port overridden by environment");
        }
        if let Some(dir) = lookup("SEPTAGO_PUZZLE_DIR") {
            debug!(%dir, "Puzzle directory overridden by environment");
            self.puzzle_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        puzzle_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(dir) = puzzle_dir {
            self.puzzle_dir = dir;
        }
        self
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
