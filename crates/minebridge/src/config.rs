//! Bridge settings.
//!
//! Read once at startup from a JSON settings file (or built in code) and
//! then copied into the server. Every field has a default except the
//! shared secret, which `validate` insists on.
//!
//! ```json
//! {
//!   "host": "0.0.0.0",
//!   "port": 8080,
//!   "auth": { "password": "change-me-please" },
//!   "response_timeout_ms": 1000,
//!   "cache_ttl_secs": 10
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest shared secret `validate` accepts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors raised while loading or checking settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Credentials game servers must present.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The shared secret every game-server process authenticates with.
    pub password: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the bridge server reads from settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Interface to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    pub auth: AuthConfig,
    /// How long a presence/location query waits before re-reading the
    /// cache. The wait always runs to the end.
    pub response_timeout_ms: u64,
    /// Lifetime of presence, location, and name↔UUID entries.
    pub cache_ttl_secs: u64,
    /// Idle time before the bridge pings a connection.
    pub ping_interval_secs: u64,
    /// Extra silence tolerated after a ping before the connection is closed.
    pub ping_timeout_secs: u64,
    /// Upper bound on sending one outbound frame, close frames included.
    pub close_timeout_secs: u64,
    /// How long connection tasks get to finish during shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8080,
            auth: AuthConfig::default(),
            response_timeout_ms: 1_000,
            cache_ttl_secs: 10,
            ping_interval_secs: 30,
            ping_timeout_secs: 10,
            close_timeout_secs: 5,
            shutdown_grace_secs: 5,
        }
    }
}

impl BridgeConfig {
    /// Loads and validates settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(config)
    }

    /// Parses and validates settings from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a running bridge can't work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be at least 1".into()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache_ttl_secs must be at least 1".into(),
            ));
        }
        if self.ping_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "ping_interval_secs must be at least 1".into(),
            ));
        }
        if self.close_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "close_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
