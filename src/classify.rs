//! Layered classification
//!
//! Assigns every record a category from the closed set and a subcategory
//! label. Layers run in order: the static name table fills unresolved
//! categories, meta-package hints and keyword heuristics fill what remains,
//! and user overrides are applied last and win unconditionally. A category
//! that is already valid is never replaced by an automated layer.

use serde_json::Value;
use std::collections::HashMap;

use crate::cache::MetaCategoryHint;
use crate::model::ToolRecord;
use crate::repo::CategoryOverride;
use crate::taxonomy::{
    self, canned_description, category_display_name, category_icon, default_subcategory,
    static_category, static_subcategory, CATEGORY_KEYWORDS, SUBCATEGORY_KEYWORDS,
};

/// Classify one record in place.
pub fn classify(
    record: &mut ToolRecord,
    overrides: &HashMap<String, CategoryOverride>,
    hints: &HashMap<String, MetaCategoryHint>,
) {
    record.normalize();
    apply_static(record);
    record.category = taxonomy::normalize_category(&record.category);
    infer(record, hints.get(&record.key()));
    if let Some(forced) = overrides.get(&record.key()) {
        apply_override(record, forced);
    }
    refresh_display_metadata(record);
}

/// Classify a whole catalog in place.
pub fn classify_all(
    records: &mut [ToolRecord],
    overrides: &HashMap<String, CategoryOverride>,
    hints: &HashMap<String, MetaCategoryHint>,
) {
    for record in records {
        classify(record, overrides, hints);
    }
}

/// Whether a category still needs resolving: empty, "other", or outside the
/// closed set.
fn is_unresolved(category: &str) -> bool {
    let slug = category.trim().to_lowercase();
    slug.is_empty() || slug == "other" || !taxonomy::is_known_category(&slug)
}

/// Static table layer, plus canned descriptions.
fn apply_static(record: &mut ToolRecord) {
    if is_unresolved(&record.category) {
        if let Some(category) = static_category(&record.name) {
            record.category = category.to_string();
        }
    }
    if record.subcategory.is_empty() {
        if let Some(sub) = static_subcategory(&record.name, &record.category) {
            record.subcategory = sub.to_string();
        }
    }
    if record.description.is_empty() {
        if let Some(description) = canned_description(&record.name) {
            record.description = description.to_string();
        }
    }
}

/// Hint and keyword layers, then the subcategory fallback chain.
fn infer(record: &mut ToolRecord, hint: Option<&MetaCategoryHint>) {
    if let Some(hint) = hint {
        if is_unresolved(&record.category) && !hint.category.is_empty() {
            record.category = hint.category.clone();
        }
        if record.subcategory.is_empty() && !hint.subcategory.is_empty() {
            record.subcategory = hint.subcategory.clone();
        }
    }

    let haystack = build_haystack(record);
    if is_unresolved(&record.category) && !haystack.is_empty() {
        if let Some(category) = match_category_keywords(&haystack) {
            record.category = category.to_string();
        }
    }

    if record.subcategory.is_empty() && !haystack.is_empty() {
        if let Some(sub) = match_subcategory_keywords(&record.category, &haystack) {
            record.subcategory = sub.to_string();
        }
    }
    if record.subcategory.is_empty() {
        if let Some(sub) = static_subcategory(&record.name, &record.category) {
            record.subcategory = sub.to_string();
        } else {
            record.subcategory = default_subcategory(&record.category).to_string();
        }
    }
}

/// User override layer. The forced category is absolute; an empty forced
/// subcategory is re-inferred within the forced category.
fn apply_override(record: &mut ToolRecord, forced: &CategoryOverride) {
    record.category = taxonomy::normalize_category(&forced.category);
    if !forced.subcategory.is_empty() {
        record.subcategory = forced.subcategory.clone();
        return;
    }
    record.subcategory = static_subcategory(&record.name, &record.category)
        .map(str::to_string)
        .unwrap_or_default();
    if record.subcategory.is_empty() {
        let haystack = build_haystack(record);
        if let Some(sub) = match_subcategory_keywords(&record.category, &haystack) {
            record.subcategory = sub.to_string();
        } else {
            record.subcategory = default_subcategory(&record.category).to_string();
        }
    }
}

/// Lowercased search text built from every descriptive field.
fn build_haystack(record: &ToolRecord) -> String {
    let mut parts: Vec<String> = vec![
        record.name.clone(),
        record.commands.join(" "),
        record.description.clone(),
        record.subpackages.join(" "),
    ];
    if let Some(keywords) = record.metadata_keywords() {
        parts.push(keywords);
    }
    parts.retain(|p| !p.trim().is_empty());
    parts.join(" ").to_lowercase()
}

fn match_category_keywords(haystack: &str) -> Option<&'static str> {
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| haystack.contains(k)) {
            return Some(category);
        }
    }
    None
}

fn match_subcategory_keywords(category: &str, haystack: &str) -> Option<&'static str> {
    let category = category.trim().to_lowercase();
    let (_, groups) = SUBCATEGORY_KEYWORDS
        .iter()
        .find(|(slug, _)| *slug == category)?;
    for (subcategory, keywords) in *groups {
        if keywords.iter().any(|k| haystack.contains(k)) {
            return Some(subcategory);
        }
    }
    None
}

/// Derived display fields kept in metadata for renderers.
fn refresh_display_metadata(record: &mut ToolRecord) {
    record.metadata.insert(
        "icon".to_string(),
        Value::String(category_icon(&record.category).to_string()),
    );
    record.metadata.insert(
        "category_display".to_string(),
        Value::String(category_display_name(&record.category)),
    );
}
