//! Client configuration.

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the library API, e.g. `http://localhost:8080`.
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Load from `BIBLIOTEKA_API_URL` (required) and `BIBLIOTEKA_TIMEOUT_MS`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(Environment::with_prefix("BIBLIOTEKA").try_parsing(true))
    }

    fn from_source(source: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("timeout_ms", DEFAULT_TIMEOUT_MS as i64)?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
