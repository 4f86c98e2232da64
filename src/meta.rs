//! Meta-package discovery
//!
//! Walks the package-manager dependency graph from the seed meta-groups,
//! recording leaf packages as tools and recursing into nested groups. Also
//! derives category hints by scanning the category-labeled meta-packages.
//! An unavailable package manager degrades to an empty result.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::MetaCategoryHint;
use crate::fetch::PackageQuery;
use crate::model::ToolRecord;
use crate::taxonomy::{
    self, DENY_PREFIXES, HARD_BLOCKLIST, HINT_DENY_PREFIXES, META_CATEGORY_SOURCES,
    META_GROUP_PREFIXES, META_SEED_GROUPS,
};

/// Source tag stamped on records discovered via meta-group traversal.
pub const META_SOURCE: &str = "meta-package";

pub struct MetaPackageFetcher {
    packages: Arc<dyn PackageQuery>,
}

impl MetaPackageFetcher {
    pub fn new(packages: Arc<dyn PackageQuery>) -> Self {
        Self { packages }
    }

    /// Breadth-first traversal of the seed meta-groups. Dependencies with a
    /// meta-group prefix are enqueued; everything else becomes a candidate
    /// tool, filtered through the deny prefixes, the blocklist, and (when a
    /// known-tools index is supplied) an alias-aware membership check.
    pub async fn discover(&self, known_index: Option<&HashSet<String>>) -> Vec<ToolRecord> {
        let mut queue: VecDeque<String> =
            META_SEED_GROUPS.iter().map(|g| g.to_string()).collect();
        let mut visited: HashSet<String> = queue.iter().cloned().collect();
        let mut seen_tools: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        while let Some(group) = queue.pop_front() {
            let deps = match self.packages.dependency_listing(&group).await {
                Ok(deps) => deps,
                Err(e) => {
                    warn!(group = %group, error = %e, "meta-group listing failed; skipping");
                    continue;
                }
            };
            debug!(group = %group, count = deps.len(), "walked meta-group");
            for dep in deps {
                let dep = dep.trim().to_lowercase();
                if dep.is_empty() || HARD_BLOCKLIST.contains(&dep.as_str()) {
                    continue;
                }
                if META_GROUP_PREFIXES.iter().any(|p| dep.starts_with(p)) {
                    if visited.insert(dep.clone()) {
                        queue.push_back(dep);
                    }
                    continue;
                }
                if DENY_PREFIXES.iter().any(|p| dep.starts_with(p)) {
                    continue;
                }
                if let Some(index) = known_index {
                    let canonical = taxonomy::normalize_alias(&dep);
                    if !index.contains(&dep) && !index.contains(canonical) {
                        continue;
                    }
                }
                if seen_tools.insert(dep.clone()) {
                    let mut record = ToolRecord::new(dep);
                    record.source = META_SOURCE.to_string();
                    records.push(record);
                }
            }
        }

        info!(count = records.len(), "meta-package discovery produced records");
        records
    }

    /// Category hints from the labeled meta-packages: each listed package
    /// inherits the group's category and default subcategory. First group
    /// wins for packages listed under several.
    pub async fn discover_hints(&self) -> HashMap<String, MetaCategoryHint> {
        let mut hints: HashMap<String, MetaCategoryHint> = HashMap::new();
        for (group, category, subcategory) in META_CATEGORY_SOURCES {
            let deps = match self.packages.dependency_listing(group).await {
                Ok(deps) => deps,
                Err(e) => {
                    debug!(group = %group, error = %e, "hint source unavailable; skipping");
                    continue;
                }
            };
            for dep in deps {
                let dep = dep.trim().to_lowercase();
                if dep.is_empty()
                    || HINT_DENY_PREFIXES.iter().any(|p| dep.starts_with(p))
                    || META_GROUP_PREFIXES.iter().any(|p| dep.starts_with(p))
                {
                    continue;
                }
                hints.entry(dep).or_insert_with(|| MetaCategoryHint {
                    category: (*category).to_string(),
                    subcategory: (*subcategory).to_string(),
                });
            }
        }
        info!(count = hints.len(), "collected meta category hints");
        hints
    }
}
