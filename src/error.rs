//! Catalog error taxonomy
//!
//! Every variant is degraded, not fatal: a failing source contributes an
//! empty result, a failing document is skipped, corrupt persisted state is
//! treated as empty. Callers log once at the subsystem boundary and keep
//! going.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Network endpoint or external process absent or erroring
    #[error("source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Document structure unrecognized; skip this document only
    #[error("could not parse document from {location}")]
    ParseFailure { location: String },

    /// Unreadable or structurally invalid persisted JSON
    #[error("corrupt persisted state at {}", path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Network or process call exceeded its deadline
    #[error("'{operation}' timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },
}

impl CatalogError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }
}
