//! Durable catalog snapshot and override persistence
//!
//! The snapshot is a JSON array of record objects; overrides are a JSON
//! object keyed by the user-entered name. Loading tolerates missing or
//! structurally invalid files by returning an empty result, which upstream
//! logic interprets as the trigger for full rediscovery.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::model::ToolRecord;
use crate::taxonomy;

/// JSON snapshot of the merged catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    path: PathBuf,
}

impl CatalogRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the snapshot. Missing or invalid files yield an empty catalog.
    /// Entries without a name are dropped; all records are normalized.
    pub fn load(&self) -> Vec<ToolRecord> {
        if !self.path.exists() {
            return Vec::new();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read catalog snapshot");
                return Vec::new();
            }
        };
        let parsed: Vec<ToolRecord> = match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                let corrupt = CatalogError::CorruptState {
                    path: self.path.clone(),
                    source: Some(e),
                };
                warn!(error = %corrupt, "catalog snapshot invalid; starting empty");
                return Vec::new();
            }
        };
        let mut records: Vec<ToolRecord> = Vec::with_capacity(parsed.len());
        for mut record in parsed {
            record.normalize();
            if record.name.is_empty() {
                continue;
            }
            records.push(record);
        }
        debug!(count = records.len(), "loaded catalog snapshot");
        records
    }

    /// Overwrite the snapshot with the full record set, creating the parent
    /// directory if needed.
    pub fn save(&self, records: &[ToolRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        let content =
            serde_json::to_string_pretty(records).context("Failed to serialize catalog")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write catalog snapshot: {}", self.path.display()))
    }
}

/// A user-authored classification that outranks all automated inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOverride {
    /// Forced category, already clamped into the closed set
    pub category: String,

    /// Forced subcategory; empty means re-infer within the category
    pub subcategory: String,

    /// The name as the user typed it, preserved for persistence
    pub original_name: String,
}

/// Persisted per-name override payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OverridePayload {
    category: String,

    #[serde(default)]
    subcategory: String,
}

/// Override file load/save. Keys on disk are the original names; keys in
/// memory are lowercased.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    path: PathBuf,
}

impl OverrideStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> HashMap<String, CategoryOverride> {
        if !self.path.exists() {
            return HashMap::new();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read category overrides");
                return HashMap::new();
            }
        };
        let raw: HashMap<String, OverridePayload> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                let corrupt = CatalogError::CorruptState {
                    path: self.path.clone(),
                    source: Some(e),
                };
                warn!(error = %corrupt, "category overrides invalid; ignoring");
                return HashMap::new();
            }
        };
        raw.into_iter()
            .map(|(name, payload)| {
                let key = name.to_lowercase();
                (
                    key,
                    CategoryOverride {
                        category: taxonomy::normalize_category(&payload.category),
                        subcategory: payload.subcategory.trim().to_string(),
                        original_name: name,
                    },
                )
            })
            .collect()
    }

    /// Persist the override map. An empty map deletes the file.
    pub fn save(&self, overrides: &HashMap<String, CategoryOverride>) -> Result<()> {
        if overrides.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).with_context(|| {
                    format!("Failed to remove override file: {}", self.path.display())
                })?;
            }
            return Ok(());
        }
        let payload: HashMap<&str, OverridePayload> = overrides
            .values()
            .map(|o| {
                (
                    o.original_name.as_str(),
                    OverridePayload {
                        category: o.category.clone(),
                        subcategory: o.subcategory.clone(),
                    },
                )
            })
            .collect();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        let content =
            serde_json::to_string_pretty(&payload).context("Failed to serialize overrides")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write overrides: {}", self.path.display()))
    }
}
