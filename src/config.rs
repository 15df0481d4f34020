//! Server configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, then the `GAMEADDR` environment variable or `--addr` flag.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime settings for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. `:PORT` binds every interface.
    listen_addr: String,

    /// Seconds a player may wait for an opponent before the game expires.
    /// Zero disables expiry.
    waiting_timeout_secs: u64,

    /// Seconds between sweeps for expired waiting players.
    sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: ":4000".to_string(),
            waiting_timeout_secs: 600,
            sweep_interval_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(listen_addr = %config.listen_addr, "Config loaded successfully");
        Ok(config)
    }

    /// Builds the effective configuration from an optional file and an
    /// optional address override.
    #[instrument]
    pub fn resolve(file: Option<&Path>, addr: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(addr) = addr {
            debug!(addr = %addr, "Overriding listen address");
            config.listen_addr = addr;
        }
        config.validate()?;
        Ok(config)
    }

    /// Replaces the listen address.
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Address in a form `TcpListener::bind` accepts.
    pub fn socket_addr(&self) -> String {
        let addr = self.listen_addr.trim();
        if addr.starts_with(':') {
            format!("0.0.0.0{}", addr)
        } else {
            addr.to_string()
        }
    }

    /// How long a player may wait for an opponent, if expiry is enabled.
    pub fn waiting_timeout(&self) -> Option<Duration> {
        (self.waiting_timeout_secs > 0).then(|| Duration::from_secs(self.waiting_timeout_secs))
    }

    /// Interval between expiry sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.trim().is_empty() {
            return Err(ConfigError::new("listen_addr must not be empty".to_string()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::new(
                "sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
