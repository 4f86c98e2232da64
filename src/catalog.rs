//! Catalog facade
//!
//! Owns the in-memory record set and wires discovery, merging,
//! classification, persistence and the package-manager scan together.
//! External capabilities are injected so tests run without a network or a
//! package manager.

use anyhow::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheStore, MetaCategoryHint};
use crate::classify;
use crate::config::DiscoveryConfig;
use crate::fetch::{AptQuery, HttpClient, HttpFetch, PackageQuery};
use crate::merge;
use crate::meta::MetaPackageFetcher;
use crate::model::ToolRecord;
use crate::repo::{CatalogRepository, CategoryOverride, OverrideStore};
use crate::taxonomy;
use crate::web::{self, WebCatalogFetcher};

/// Aggregate catalog statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub installed: usize,
    pub available: usize,
    pub installed_percentage: f64,
    pub total_size_bytes: u64,
    /// Per-category totals, keyed by slug
    pub categories: HashMap<String, CategoryCount>,
}

/// Total and installed record counts within one category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryCount {
    pub total: usize,
    pub installed: usize,
}

pub struct ToolCatalog {
    config: DiscoveryConfig,
    records: Vec<ToolRecord>,
    overrides: HashMap<String, CategoryOverride>,
    hints: HashMap<String, MetaCategoryHint>,
    repo: CatalogRepository,
    override_store: OverrideStore,
    cache: CacheStore,
    http: Arc<dyn HttpFetch>,
    packages: Arc<dyn PackageQuery>,
}

impl ToolCatalog {
    /// Open the catalog with production capabilities.
    pub fn open(config: DiscoveryConfig) -> Result<Self> {
        let http: Arc<dyn HttpFetch> = Arc::new(HttpClient::new()?);
        let packages: Arc<dyn PackageQuery> = Arc::new(AptQuery::new());
        Ok(Self::with_capabilities(config, http, packages))
    }

    /// Open the catalog with injected capabilities (tests use stubs).
    pub fn with_capabilities(
        config: DiscoveryConfig,
        http: Arc<dyn HttpFetch>,
        packages: Arc<dyn PackageQuery>,
    ) -> Self {
        let repo = CatalogRepository::new(config.snapshot_path());
        let override_store = OverrideStore::new(config.overrides_path());
        let cache = CacheStore::new(config.web_link_cache_path(), config.meta_hint_cache_path());

        let mut records = repo.load();
        let overrides = override_store.load();
        let hints = cache.load_meta_hints(config.hint_ttl_hours);
        classify::classify_all(&mut records, &overrides, &hints);

        Self {
            config,
            records,
            overrides,
            hints,
            repo,
            override_store,
            cache,
            http,
            packages,
        }
    }

    pub fn records(&self) -> &[ToolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up one record by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&ToolRecord> {
        let key = name.trim().to_lowercase();
        self.records.iter().find(|r| r.key() == key)
    }

    /// Case-insensitive substring search over names, commands, descriptions
    /// and subpackages.
    pub fn search(&self, query: &str) -> Vec<&ToolRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
                    || r.commands.iter().any(|c| c.to_lowercase().contains(&needle))
                    || r.subpackages
                        .iter()
                        .any(|s| s.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn filter_by_category(&self, slug: &str) -> Vec<&ToolRecord> {
        let slug = taxonomy::normalize_category(slug);
        self.records.iter().filter(|r| r.category == slug).collect()
    }

    pub fn filter_by_status(&self, installed: bool) -> Vec<&ToolRecord> {
        self.records
            .iter()
            .filter(|r| r.installed == installed)
            .collect()
    }

    /// Force a record's classification. An empty subcategory means re-infer
    /// within the forced category. Persists and reclassifies immediately.
    pub fn set_override(
        &mut self,
        name: &str,
        category: &str,
        subcategory: &str,
    ) -> Result<()> {
        let key = name.trim().to_lowercase();
        self.overrides.insert(
            key,
            CategoryOverride {
                category: taxonomy::normalize_category(category),
                subcategory: subcategory.trim().to_string(),
                original_name: name.trim().to_string(),
            },
        );
        self.override_store.save(&self.overrides)?;
        self.reclassify(name);
        self.repo.save(&self.records)
    }

    /// Drop a record's override and let the automated layers re-resolve it.
    pub fn clear_override(&mut self, name: &str) -> Result<()> {
        let key = name.trim().to_lowercase();
        if self.overrides.remove(&key).is_none() {
            return Ok(());
        }
        self.override_store.save(&self.overrides)?;
        if let Some(record) = self.records.iter_mut().find(|r| r.key() == key) {
            // Reset so inference starts from scratch rather than preserving
            // the previously forced value.
            record.category = "other".to_string();
            record.subcategory = String::new();
        }
        self.reclassify(name);
        self.repo.save(&self.records)
    }

    /// Remove one record by name, case-insensitively, persisting the result.
    /// Returns whether a record was removed.
    pub fn remove_record(&mut self, name: &str) -> Result<bool> {
        let key = name.trim().to_lowercase();
        let before = self.records.len();
        self.records.retain(|r| r.key() != key);
        if self.records.len() == before {
            return Ok(false);
        }
        self.repo.save(&self.records)?;
        Ok(true)
    }

    /// Run full discovery: web index, meta-package traversal, merge,
    /// classification, persistence. Individual source failures degrade to
    /// empty contributions. Returns the number of newly added records.
    pub async fn refresh_from_sources(&mut self) -> Result<usize> {
        let existing: HashSet<String> = self.records.iter().map(|r| r.key()).collect();

        let web_fetcher = WebCatalogFetcher::new(
            Arc::clone(&self.http),
            self.config.clone(),
            self.cache.clone(),
        );
        let web_records = match web_fetcher.discover(&existing).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "web discovery unavailable; continuing without it");
                Vec::new()
            }
        };

        // Known-tools index from the cached URL list (age ignored), used to
        // cross-check meta-package candidates.
        let known_index: Option<HashSet<String>> = self.cache.load_web_links(0).map(|urls| {
            urls.iter()
                .filter_map(|url| web::url_slug(url))
                .collect()
        });

        let meta_fetcher = MetaPackageFetcher::new(Arc::clone(&self.packages));
        let meta_records = meta_fetcher.discover(known_index.as_ref()).await;

        if self.hints.is_empty() {
            let hints = meta_fetcher.discover_hints().await;
            if !hints.is_empty() {
                self.cache.save_meta_hints(&hints);
                self.hints = hints;
            }
        }

        let snapshot = std::mem::take(&mut self.records);
        let mut merged = merge::merge(snapshot, vec![web_records, meta_records]);
        classify::classify_all(&mut merged, &self.overrides, &self.hints);
        self.records = merged;
        self.repo.save(&self.records)?;
        let added = self
            .records
            .iter()
            .filter(|r| !existing.contains(&r.key()))
            .count();
        info!(total = self.records.len(), added, "catalog refreshed");
        Ok(added)
    }

    /// Mark records installed from one fresh package-manager listing,
    /// filling in sizes and descriptions for installed records that lack
    /// them. Returns (installed, total).
    pub async fn scan_installed(&mut self) -> Result<(usize, usize)> {
        self.packages.invalidate();
        let installed = self.packages.installed_packages().await;
        let mut installed_count = 0;
        for record in &mut self.records {
            let key = record.key();
            record.installed = installed.contains(&key)
                || record
                    .subpackages
                    .iter()
                    .any(|sub| installed.contains(&sub.to_lowercase()));
            if record.installed {
                installed_count += 1;
                if record.size == 0 {
                    record.size = self.packages.size(&key).await;
                }
                if record.description.is_empty() {
                    if let Some(description) = self.packages.description(&key).await {
                        record.description = description;
                    }
                }
            }
        }
        self.repo.save(&self.records)?;
        info!(
            installed = installed_count,
            total = self.records.len(),
            "installed scan complete"
        );
        Ok((installed_count, self.records.len()))
    }

    pub fn statistics(&self) -> CatalogStats {
        let total = self.records.len();
        let installed = self.records.iter().filter(|r| r.installed).count();
        let total_size_bytes = self.records.iter().map(|r| r.size).sum();
        let mut categories: HashMap<String, CategoryCount> = HashMap::new();
        for record in &self.records {
            let entry = categories.entry(record.category.clone()).or_default();
            entry.total += 1;
            if record.installed {
                entry.installed += 1;
            }
        }
        CatalogStats {
            total,
            installed,
            available: total - installed,
            installed_percentage: if total == 0 {
                0.0
            } else {
                installed as f64 * 100.0 / total as f64
            },
            total_size_bytes,
            categories,
        }
    }

    fn reclassify(&mut self, name: &str) {
        let key = name.trim().to_lowercase();
        if let Some(record) = self.records.iter_mut().find(|r| r.key() == key) {
            classify::classify(record, &self.overrides, &self.hints);
        }
    }
}

#[cfg(test)]
mod catalog_tests {
    use super::*;
    use crate::error::CatalogError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct StubHttp {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl HttpFetch for StubHttp {
        async fn fetch(&self, url: &str) -> Result<String, CatalogError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| CatalogError::source_unavailable(url, "no such page"))
        }
    }

    #[derive(Default)]
    struct StubPackages {
        installed: HashSet<String>,
        listings: HashMap<String, Vec<String>>,
        invalidations: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl PackageQuery for StubPackages {
        async fn is_installed(&self, name: &str) -> bool {
            self.installed.contains(name)
        }

        async fn installed_packages(&self) -> HashSet<String> {
            self.installed.clone()
        }

        async fn dependencies(&self, name: &str) -> Vec<String> {
            self.dependency_listing(name).await.unwrap_or_default()
        }

        async fn size(&self, _name: &str) -> u64 {
            2048
        }

        async fn dependency_listing(&self, meta_group: &str) -> Result<Vec<String>, CatalogError> {
            self.listings
                .get(meta_group)
                .cloned()
                .ok_or_else(|| CatalogError::source_unavailable(meta_group, "not found"))
        }

        async fn description(&self, _name: &str) -> Option<String> {
            Some("from package manager".to_string())
        }

        fn invalidate(&self) {
            self.invalidations
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn tool_page(name: &str, tag: &str) -> String {
        format!(
            r#"<html><body><dl><dt>Package</dt><dd>{name}</dd>
               <dt>Tags</dt><dd><a>{tag}</a></dd></dl></body></html>"#
        )
    }

    fn stub_pages() -> HashMap<String, String> {
        let index = r#"
            <a href="/tools/nmap/">nmap</a>
            <a href="/tools/hydra/">hydra</a>
        "#;
        let mut pages = HashMap::new();
        pages.insert(
            "https://www.kali.org/tools/all-tools/".to_string(),
            index.to_string(),
        );
        pages.insert(
            "https://www.kali.org/tools/nmap/".to_string(),
            tool_page("nmap", "recon"),
        );
        pages.insert(
            "https://www.kali.org/tools/hydra/".to_string(),
            tool_page("hydra", "cracking"),
        );
        pages
    }

    fn stub_packages() -> StubPackages {
        StubPackages {
            installed: HashSet::from(["nmap".to_string()]),
            listings: HashMap::from([
                (
                    "kali-linux-top10".to_string(),
                    vec!["nmap".to_string(), "wireshark".to_string()],
                ),
                ("kali-linux-default".to_string(), Vec::new()),
            ]),
            ..Default::default()
        }
    }

    fn catalog_with_packages(dir: &TempDir, packages: Arc<StubPackages>) -> ToolCatalog {
        let config =
            DiscoveryConfig::with_data_dir(dir.path()).request_delay(std::time::Duration::ZERO);
        ToolCatalog::with_capabilities(
            config,
            Arc::new(StubHttp {
                pages: stub_pages(),
            }),
            packages,
        )
    }

    fn catalog(dir: &TempDir) -> ToolCatalog {
        catalog_with_packages(dir, Arc::new(stub_packages()))
    }

    #[tokio::test]
    async fn test_refresh_discovers_and_classifies() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);

        let count = cat.refresh_from_sources().await.unwrap();
        assert_eq!(count, 2);

        let nmap = cat.get("nmap").unwrap();
        assert_eq!(nmap.category, "recon");
        assert_eq!(nmap.subcategory, "Port Scan");

        let hydra = cat.get("HYDRA").unwrap();
        assert_eq!(hydra.category, "password");
    }

    #[tokio::test]
    async fn test_refresh_returns_added_count_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);

        let first = cat.refresh_from_sources().await.unwrap();
        assert_eq!(first, 2);

        let records_after_first = cat.records().to_vec();
        let second = cat.refresh_from_sources().await.unwrap();
        assert_eq!(second, 0, "second refresh discovered nothing new");
        assert_eq!(cat.records(), records_after_first.as_slice());
    }

    #[tokio::test]
    async fn test_meta_candidates_cross_checked_against_web_index() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();
        // wireshark came only from the meta listing and is not in the web
        // index, so the cross-check drops it.
        assert!(cat.get("wireshark").is_none());
    }

    #[tokio::test]
    async fn test_scan_installed_marks_and_enriches() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();

        let (installed, total) = cat.scan_installed().await.unwrap();
        assert_eq!((installed, total), (1, 2));

        let nmap = cat.get("nmap").unwrap();
        assert!(nmap.installed);
        assert_eq!(nmap.size, 2048);
        assert!(!cat.get("hydra").unwrap().installed);
    }

    #[tokio::test]
    async fn test_scan_installed_refreshes_listing_cache() {
        let dir = TempDir::new().unwrap();
        let packages = Arc::new(stub_packages());
        let mut cat = catalog_with_packages(&dir, Arc::clone(&packages));
        cat.refresh_from_sources().await.unwrap();

        cat.scan_installed().await.unwrap();
        cat.scan_installed().await.unwrap();
        // Each scan drops cached listing state before re-reading.
        assert_eq!(
            packages
                .invalidations
                .load(std::sync::atomic::Ordering::SeqCst),
            2
        );
    }

    #[tokio::test]
    async fn test_override_survives_refresh() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();

        cat.set_override("nmap", "password", "Offline").unwrap();
        assert_eq!(cat.get("nmap").unwrap().category, "password");

        cat.refresh_from_sources().await.unwrap();
        let nmap = cat.get("nmap").unwrap();
        assert_eq!(nmap.category, "password");
        assert_eq!(nmap.subcategory, "Offline");
    }

    #[tokio::test]
    async fn test_clear_override_reinfers() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();

        cat.set_override("nmap", "password", "").unwrap();
        assert_eq!(cat.get("nmap").unwrap().category, "password");

        cat.clear_override("nmap").unwrap();
        assert_eq!(cat.get("nmap").unwrap().category, "recon");
    }

    #[tokio::test]
    async fn test_remove_record_case_insensitive_and_persisted() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();

        assert!(cat.remove_record("NMAP").unwrap());
        assert!(!cat.remove_record("nmap").unwrap());
        assert!(cat.get("nmap").is_none());

        // Removal is durable across a reopen.
        let reopened = catalog(&dir);
        assert!(reopened.get("nmap").is_none());
        assert!(reopened.get("hydra").is_some());
    }

    #[tokio::test]
    async fn test_search_and_filters() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();
        cat.scan_installed().await.unwrap();

        assert_eq!(cat.search("hyd").len(), 1);
        assert_eq!(cat.search("").len(), 2);
        assert_eq!(cat.filter_by_category("recon").len(), 1);
        assert_eq!(cat.filter_by_status(true).len(), 1);
        assert_eq!(cat.filter_by_status(false).len(), 1);
    }

    #[tokio::test]
    async fn test_statistics() {
        let dir = TempDir::new().unwrap();
        let mut cat = catalog(&dir);
        cat.refresh_from_sources().await.unwrap();
        cat.scan_installed().await.unwrap();

        let stats = cat.statistics();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.installed, 1);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.installed_percentage, 50.0);
        let recon = stats.categories.get("recon").unwrap();
        assert_eq!((recon.total, recon.installed), (1, 1));
        let password = stats.categories.get("password").unwrap();
        assert_eq!((password.total, password.installed), (1, 0));
        assert_eq!(stats.total_size_bytes, 2048);
    }

    #[tokio::test]
    async fn test_offline_refresh_falls_back_to_seed() {
        let dir = TempDir::new().unwrap();
        let config = DiscoveryConfig::with_data_dir(dir.path());
        let http = StubHttp {
            pages: HashMap::new(),
        };
        let packages = StubPackages::default();
        let mut cat =
            ToolCatalog::with_capabilities(config, Arc::new(http), Arc::new(packages));

        let count = cat.refresh_from_sources().await.unwrap();
        assert_eq!(count, crate::taxonomy::SEED_ENTRIES.len());
        assert!(cat.get("sqlmap").is_some());
    }
}
