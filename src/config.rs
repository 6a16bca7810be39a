//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the read-through cache can hold
    pub max_entries: usize,
    /// Revalidate TTL in seconds for cached reads, 0 = entries live until invalidated
    pub cache_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Number of shared word lists per page
    pub page_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL` - Revalidate TTL in seconds, 0 disables (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `PAGE_SIZE` - Shared lists per page (default: 12)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            page_size: parse_var("PAGE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
        }
    }

    /// Returns the cache TTL, or None when cached reads never expire.
    pub fn ttl(&self) -> Option<u64> {
        (self.cache_ttl > 0).then_some(self.cache_ttl)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            cache_ttl: 0,
            server_port: 3000,
            cleanup_interval: 1,
            page_size: 12,
        }
    }
}
