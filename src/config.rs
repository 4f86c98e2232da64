//! Discovery configuration
//!
//! Worker pool width, request pacing, cache TTLs and on-disk locations.
//! Floors are enforced at construction time so the rest of the crate can
//! rely on them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Minimum worker pool width
pub const MIN_WORKERS: usize = 2;

/// Default worker pool width
pub const DEFAULT_WORKERS: usize = 8;

/// Default pause applied before each page fetch
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 200;

/// Default TTL for the discovered URL list (hours)
pub const DEFAULT_WEB_TTL_HOURS: u64 = 168;

/// Default TTL for the meta-category hint cache (hours)
pub const DEFAULT_HINT_TTL_HOURS: u64 = 240;

/// Default timeout for one HTTP fetch (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Default timeout for one package-manager invocation (seconds)
pub const DEFAULT_PROCESS_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Bounded worker pool size, never below [`MIN_WORKERS`]
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Delay in milliseconds before each page fetch
    #[serde(default = "default_delay_ms")]
    pub request_delay_ms: u64,

    /// TTL for the web link cache; 0 disables age-based expiry
    #[serde(default = "default_web_ttl")]
    pub web_ttl_hours: u64,

    /// TTL for the meta-hint cache; 0 disables age-based expiry
    #[serde(default = "default_hint_ttl")]
    pub hint_ttl_hours: u64,

    /// Index page listing every tool
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Site root, used to recognize tool-page links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory holding the snapshot, caches and overrides
    pub data_dir: PathBuf,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_delay_ms() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}

fn default_web_ttl() -> u64 {
    DEFAULT_WEB_TTL_HOURS
}

fn default_hint_ttl() -> u64 {
    DEFAULT_HINT_TTL_HOURS
}

fn default_index_url() -> String {
    "https://www.kali.org/tools/all-tools/".to_string()
}

fn default_base_url() -> String {
    "https://www.kali.org".to_string()
}

impl DiscoveryConfig {
    /// Configuration rooted at the platform data directory.
    pub fn new() -> Self {
        let data_dir = directories::ProjectDirs::from("dev", "arsenal", "arsenal")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".arsenal"));
        Self::with_data_dir(data_dir)
    }

    /// Configuration rooted at an explicit directory (tests use a tempdir).
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            web_ttl_hours: DEFAULT_WEB_TTL_HOURS,
            hint_ttl_hours: DEFAULT_HINT_TTL_HOURS,
            index_url: default_index_url(),
            base_url: default_base_url(),
            data_dir: data_dir.into(),
        }
    }

    /// Set the pool width, clamped to the floor of [`MIN_WORKERS`].
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(MIN_WORKERS);
        self
    }

    /// Set the per-request delay. Zero is allowed and means no pacing.
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("tools_merged.json")
    }

    pub fn overrides_path(&self) -> PathBuf {
        self.data_dir.join("category_overrides.json")
    }

    pub fn web_link_cache_path(&self) -> PathBuf {
        self.data_dir.join("web_links.json")
    }

    pub fn meta_hint_cache_path(&self) -> PathBuf {
        self.data_dir.join("meta_hints.json")
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_worker_floor_enforced() {
        let config = DiscoveryConfig::with_data_dir("/tmp/x").workers(0);
        assert_eq!(config.workers, MIN_WORKERS);

        let config = DiscoveryConfig::with_data_dir("/tmp/x").workers(32);
        assert_eq!(config.workers, 32);
    }

    #[test]
    fn test_zero_delay_allowed() {
        let config = DiscoveryConfig::with_data_dir("/tmp/x").request_delay(Duration::ZERO);
        assert_eq!(config.delay(), Duration::ZERO);
    }

    #[test]
    fn test_paths_rooted_at_data_dir() {
        let config = DiscoveryConfig::with_data_dir("/tmp/arsenal");
        assert!(config.snapshot_path().starts_with("/tmp/arsenal"));
        assert!(config.overrides_path().ends_with("category_overrides.json"));
    }
}
