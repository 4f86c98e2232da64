//! Catalog merging
//!
//! Combines the durable snapshot with freshly fetched record batches by
//! strict insert-if-absent: the snapshot is authoritative and a fetched
//! record contributes only when its name is not already present. A
//! snapshot whose name set exactly matches a historical built-in seed is a
//! truncated prior run and is discarded so discovery starts over. When
//! everything comes up empty the built-in seed is the last resort.

use std::collections::HashSet;
use tracing::{info, warn};

use crate::model::ToolRecord;
use crate::taxonomy::{fallback_name_sets, SEED_ENTRIES};

/// Source tag stamped on built-in seed records.
pub const SEED_SOURCE: &str = "seed";

/// Whether a snapshot is a stale relic of a seed-only run: its lowercased
/// name set equals one of the historical fallback sets exactly.
pub fn is_stale_fallback(records: &[ToolRecord]) -> bool {
    if records.is_empty() {
        return false;
    }
    let names: HashSet<String> = records.iter().map(|r| r.key()).collect();
    fallback_name_sets().iter().any(|set| *set == names)
}

/// Merge the snapshot with fetched batches into one deduplicated catalog.
pub fn merge(snapshot: Vec<ToolRecord>, fetched: Vec<Vec<ToolRecord>>) -> Vec<ToolRecord> {
    let snapshot = if is_stale_fallback(&snapshot) {
        warn!("snapshot matches a built-in fallback set; discarding it for rediscovery");
        Vec::new()
    } else {
        snapshot
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<ToolRecord> = Vec::new();

    for mut record in snapshot.into_iter().chain(fetched.into_iter().flatten()) {
        record.normalize();
        let key = record.key();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        merged.push(record);
    }

    if merged.is_empty() {
        warn!("all discovery sources empty; falling back to the built-in seed");
        merged = seed_records();
    }
    info!(count = merged.len(), "merged catalog");
    merged
}

/// The built-in seed catalog.
pub fn seed_records() -> Vec<ToolRecord> {
    SEED_ENTRIES
        .iter()
        .map(|(name, category)| {
            let mut record = ToolRecord::new(*name);
            record.category = (*category).to_string();
            record.source = SEED_SOURCE.to_string();
            record.normalize();
            record
        })
        .collect()
}
