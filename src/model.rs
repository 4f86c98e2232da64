//! Canonical tool record
//!
//! One `ToolRecord` per discoverable package. Identity is the lowercased
//! name; two records with the same lowercased name are the same entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single catalog entry with its classification metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Package name (unique identity key, compared case-insensitively)
    pub name: String,

    /// Invocable commands; the name itself is always first
    #[serde(default)]
    pub commands: Vec<String>,

    /// Whether the package is currently installed
    #[serde(default)]
    pub installed: bool,

    /// Category slug from the closed set (see [`crate::taxonomy`])
    #[serde(default = "default_category")]
    pub category: String,

    /// Free-text subcategory label, may be empty
    #[serde(default)]
    pub subcategory: String,

    /// Short human-readable description
    #[serde(default)]
    pub description: String,

    /// Installed size in bytes, 0 when unknown
    #[serde(default)]
    pub size: u64,

    /// Related package names discovered on the same page
    #[serde(default)]
    pub subpackages: Vec<String>,

    /// Provenance tag ("kali.org", "meta-package", "seed", ...)
    #[serde(default)]
    pub source: String,

    /// Derived display fields (icon, category_display) and open metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

fn default_category() -> String {
    "other".to_string()
}

impl ToolRecord {
    /// Create a record with just a name; everything else takes defaults.
    pub fn new(name: impl Into<String>) -> Self {
        let mut record = Self {
            name: name.into(),
            commands: Vec::new(),
            installed: false,
            category: default_category(),
            subcategory: String::new(),
            description: String::new(),
            size: 0,
            subpackages: Vec::new(),
            source: String::new(),
            metadata: serde_json::Map::new(),
        };
        record.normalize();
        record
    }

    /// The identity key for merging and lookups.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// Enforce the structural invariants: trimmed non-empty name, commands
    /// deduplicated case-insensitively with the name first, lowercased
    /// category slug, deduplicated subpackages.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.commands = dedupe_ci(&self.commands);
        if !self.name.is_empty()
            && !self
                .commands
                .iter()
                .any(|cmd| cmd.eq_ignore_ascii_case(&self.name))
        {
            self.commands.insert(0, self.name.clone());
        }
        self.category = self.category.trim().to_lowercase();
        if self.category.is_empty() {
            self.category = default_category();
        }
        self.subcategory = self.subcategory.trim().to_string();
        self.description = self.description.trim().to_string();
        self.subpackages = dedupe_ci(&self.subpackages);
        self.source = self.source.trim().to_string();
    }

    /// Metadata keyword list flattened to a search string, if present.
    pub fn metadata_keywords(&self) -> Option<String> {
        match self.metadata.get("keywords") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }
}

/// Deduplicate case-insensitively, preserving first-seen order and casing.
/// Empty and whitespace-only entries are dropped.
pub fn dedupe_ci(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for value in values {
        let text = value.trim();
        if text.is_empty() {
            continue;
        }
        if seen.insert(text.to_lowercase()) {
            result.push(text.to_string());
        }
    }
    result
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_always_first_command() {
        let mut record = ToolRecord::new("Nmap");
        record.commands = vec!["ncat".to_string()];
        record.normalize();
        assert_eq!(record.commands[0].to_lowercase(), "nmap");
        assert_eq!(record.commands.len(), 2);
    }

    #[test]
    fn test_name_not_duplicated_when_present() {
        let mut record = ToolRecord::new("nmap");
        record.commands = vec!["NMAP".to_string(), "ncat".to_string()];
        record.normalize();
        assert_eq!(record.commands, vec!["NMAP", "ncat"]);
    }

    #[test]
    fn test_dedupe_preserves_order_and_casing() {
        let values = vec![
            "Alpha".to_string(),
            " alpha ".to_string(),
            "beta".to_string(),
            String::new(),
        ];
        assert_eq!(dedupe_ci(&values), vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let a = ToolRecord::new("Wireshark");
        let b = ToolRecord::new("wireshark");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_empty_category_normalizes_to_other() {
        let mut record = ToolRecord::new("foo");
        record.category = "  ".to_string();
        record.normalize();
        assert_eq!(record.category, "other");
    }

    #[test]
    fn test_round_trip_keeps_fields() {
        let mut record = ToolRecord::new("hydra");
        record.category = "password".to_string();
        record.subcategory = "Online".to_string();
        record.size = 4096;
        let json = serde_json::to_string(&record).unwrap();
        let back: ToolRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_metadata_keywords_array_and_string() {
        let mut record = ToolRecord::new("foo");
        record
            .metadata
            .insert("keywords".into(), serde_json::json!(["wifi", "wpa"]));
        assert_eq!(record.metadata_keywords().unwrap(), "wifi wpa");

        record
            .metadata
            .insert("keywords".into(), serde_json::json!("packet capture"));
        assert_eq!(record.metadata_keywords().unwrap(), "packet capture");
    }
}
