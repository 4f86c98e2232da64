//! TTL-gated JSON caches
//!
//! Two independent caches persist as timestamped JSON blobs: the discovered
//! tool-page URL list and the meta-category hints. A cache older than its
//! TTL is treated as empty; `ttl_hours == 0` disables age checking entirely.
//! Missing or corrupt files are also treated as empty.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::CatalogError;

/// Persisted shape of the discovered URL list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebLinkCache {
    /// Unix timestamp of the fetch that produced the list
    pub timestamp: u64,

    /// Tool page URLs, in discovery order
    pub tool_urls: Vec<String>,
}

/// A category/subcategory pair inferred from a meta-package scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaCategoryHint {
    pub category: String,

    #[serde(default)]
    pub subcategory: String,
}

/// Persisted shape of the meta-category hint cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaHintCache {
    pub timestamp: u64,

    /// Lowercased tool name -> hint
    pub hints: HashMap<String, MetaCategoryHint>,
}

/// Store for both caches, rooted at the configured data directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    web_links_path: PathBuf,
    meta_hints_path: PathBuf,
}

impl CacheStore {
    pub fn new(web_links_path: PathBuf, meta_hints_path: PathBuf) -> Self {
        Self {
            web_links_path,
            meta_hints_path,
        }
    }

    /// Load the cached URL list if present and unexpired.
    pub fn load_web_links(&self, ttl_hours: u64) -> Option<Vec<String>> {
        let cache: WebLinkCache = read_json(&self.web_links_path)?;
        if !is_fresh(cache.timestamp, ttl_hours) {
            debug!(path = %self.web_links_path.display(), "web link cache expired");
            return None;
        }
        if cache.tool_urls.is_empty() {
            return None;
        }
        Some(cache.tool_urls)
    }

    /// Persist a freshly discovered URL list with the current timestamp.
    pub fn save_web_links(&self, urls: &[String]) {
        let cache = WebLinkCache {
            timestamp: now_secs(),
            tool_urls: urls.to_vec(),
        };
        write_json(&self.web_links_path, &cache);
    }

    /// Load meta hints if present and unexpired; hint categories are
    /// clamped into the closed category set on the way in.
    pub fn load_meta_hints(&self, ttl_hours: u64) -> HashMap<String, MetaCategoryHint> {
        let Some(cache) = read_json::<MetaHintCache>(&self.meta_hints_path) else {
            return HashMap::new();
        };
        if !is_fresh(cache.timestamp, ttl_hours) {
            debug!(path = %self.meta_hints_path.display(), "meta hint cache expired");
            return HashMap::new();
        }
        cache
            .hints
            .into_iter()
            .map(|(name, hint)| {
                (
                    name.to_lowercase(),
                    MetaCategoryHint {
                        category: crate::taxonomy::normalize_category(&hint.category),
                        subcategory: hint.subcategory.trim().to_string(),
                    },
                )
            })
            .collect()
    }

    pub fn save_meta_hints(&self, hints: &HashMap<String, MetaCategoryHint>) {
        let cache = MetaHintCache {
            timestamp: now_secs(),
            hints: hints.clone(),
        };
        write_json(&self.meta_hints_path, &cache);
    }
}

/// Whether a timestamp is still inside the TTL window. A TTL of zero
/// disables age checking.
pub fn is_fresh(timestamp: u64, ttl_hours: u64) -> bool {
    if ttl_hours == 0 {
        return true;
    }
    let age = now_secs().saturating_sub(timestamp);
    age <= ttl_hours * 3600
}

pub fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read cache file");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            let corrupt = CatalogError::CorruptState {
                path: path.to_path_buf(),
                source: Some(e),
            };
            warn!(error = %corrupt, "cache file invalid; ignoring");
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(path = %parent.display(), error = %e, "could not create cache directory");
            return;
        }
    }
    match serde_json::to_string_pretty(value) {
        Ok(content) => {
            if let Err(e) = std::fs::write(path, content) {
                warn!(path = %path.display(), error = %e, "could not write cache file");
            }
        }
        Err(e) => warn!(error = %e, "could not serialize cache"),
    }
}
