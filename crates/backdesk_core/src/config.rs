//! Configuration loading from environment variables.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Default API base when `BACKDESK_SERVER` is unset.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000/api";
/// Default application-level request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default rows requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default search debounce window, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Runtime configuration for backdesk clients.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_url: env::var("BACKDESK_SERVER")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.server_url),
            token: env::var("BACKDESK_TOKEN")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            timeout_secs: env_parsed("BACKDESK_TIMEOUT_SECS", defaults.timeout_secs),
            page_size: env_parsed("BACKDESK_PAGE_SIZE", defaults.page_size).max(1),
            debounce_ms: env_parsed("BACKDESK_DEBOUNCE_MS", defaults.debounce_ms),
        }
    }

    /// Application-level timeout for a single request.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Debounce window applied to search input.
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
