//! Backend configuration loaded from `CHAT_`-prefixed environment variables.

use serde::Deserialize;
use std::time::Duration;

/// Backend configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite file holding the user directory (`CHAT_DATABASE_PATH`).
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Maximum pooled connections (`CHAT_POOL_SIZE`).
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// How long a connection waits on a locked database before failing (`CHAT_BUSY_TIMEOUT_MS`).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_database_path() -> String {
    "chat.db".to_string()
}

fn default_pool_size() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed("CHAT_").from_env()
    }

    pub fn with_database_path(path: impl Into<String>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.is_empty() {
            return Err("CHAT_DATABASE_PATH must not be empty".to_string());
        }

        if self.pool_size == 0 {
            return Err("CHAT_POOL_SIZE must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
