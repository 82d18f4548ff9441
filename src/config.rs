//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::{LruCache, DEFAULT_MAX_SIZE};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold (0 = default capacity)
    pub max_entries: usize,
    /// Disables capacity eviction entirely
    pub unbounded: bool,
    /// TTL in seconds for set requests without an explicit expiration
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 50000)
    /// - `UNBOUNDED` - `true` or `1` to disable capacity eviction (default: false)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            unbounded: env::var("UNBOUNDED")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(defaults.unbounded),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Builds the cache described by this configuration.
    pub fn build_cache(&self) -> LruCache<String, String> {
        if self.unbounded {
            LruCache::unbounded()
        } else {
            LruCache::new(self.max_entries)
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_SIZE,
            unbounded: false,
            default_ttl: 300,
            server_port: 3000,
        }
    }
}
