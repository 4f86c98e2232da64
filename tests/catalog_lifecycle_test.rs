//! End-to-end catalog lifecycle: discovery, persistence, overrides and
//! stale-snapshot recovery

use arsenal::config::DiscoveryConfig;
use arsenal::error::CatalogError;
use arsenal::fetch::{HttpFetch, PackageQuery};
use arsenal::model::ToolRecord;
use arsenal::repo::CatalogRepository;
use arsenal::taxonomy::SEED_ENTRIES;
use arsenal::ToolCatalog;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
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

struct StubPackages {
    installed: HashSet<String>,
    listings: HashMap<String, Vec<String>>,
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
        1024
    }

    async fn dependency_listing(&self, meta_group: &str) -> Result<Vec<String>, CatalogError> {
        self.listings
            .get(meta_group)
            .cloned()
            .ok_or_else(|| CatalogError::source_unavailable(meta_group, "not found"))
    }

    async fn description(&self, _name: &str) -> Option<String> {
        None
    }
}

fn tool_page(name: &str, tag: &str) -> String {
    format!(
        "<html><body><dl><dt>Package</dt><dd>{name}</dd>\
         <dt>Tags</dt><dd><a>{tag}</a></dd></dl></body></html>"
    )
}

fn online_stubs() -> (StubHttp, StubPackages) {
    let mut pages = HashMap::new();
    pages.insert(
        "https://www.kali.org/tools/all-tools/".to_string(),
        r#"<a href="/tools/nmap/">nmap</a>
           <a href="/tools/hydra/">hydra</a>
           <a href="/tools/wireshark/">wireshark</a>"#
            .to_string(),
    );
    pages.insert(
        "https://www.kali.org/tools/nmap/".to_string(),
        tool_page("nmap", "recon"),
    );
    pages.insert(
        "https://www.kali.org/tools/hydra/".to_string(),
        tool_page("hydra", "cracking"),
    );
    pages.insert(
        "https://www.kali.org/tools/wireshark/".to_string(),
        tool_page("wireshark", "capture"),
    );

    let packages = StubPackages {
        installed: HashSet::from(["nmap".to_string(), "wireshark".to_string()]),
        listings: HashMap::from([
            (
                "kali-linux-top10".to_string(),
                vec!["nmap".to_string(), "hydra".to_string()],
            ),
            ("kali-linux-default".to_string(), Vec::new()),
        ]),
    };
    (StubHttp { pages }, packages)
}

fn offline_stubs() -> (StubHttp, StubPackages) {
    (
        StubHttp {
            pages: HashMap::new(),
        },
        StubPackages {
            installed: HashSet::new(),
            listings: HashMap::new(),
        },
    )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn open_catalog(dir: &TempDir, http: StubHttp, packages: StubPackages) -> ToolCatalog {
    let config = DiscoveryConfig::with_data_dir(dir.path()).request_delay(Duration::ZERO);
    ToolCatalog::with_capabilities(config, Arc::new(http), Arc::new(packages))
}

#[tokio::test]
async fn test_full_lifecycle_discover_scan_persist() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let (http, packages) = online_stubs();
    let mut catalog = open_catalog(&dir, http, packages);

    let count = catalog.refresh_from_sources().await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(catalog.get("nmap").unwrap().category, "recon");
    assert_eq!(catalog.get("hydra").unwrap().category, "password");
    assert_eq!(catalog.get("wireshark").unwrap().category, "sniffing");

    let (installed, total) = catalog.scan_installed().await.unwrap();
    assert_eq!((installed, total), (2, 3));

    // Offline reopen serves the persisted snapshot.
    let (http, packages) = offline_stubs();
    let reopened = open_catalog(&dir, http, packages);
    assert_eq!(reopened.len(), 3);
    assert!(reopened.get("nmap").unwrap().installed);
    assert_eq!(reopened.get("nmap").unwrap().size, 1024);
}

#[tokio::test]
async fn test_override_persists_across_reopen_and_refresh() {
    let dir = TempDir::new().unwrap();
    let (http, packages) = online_stubs();
    let mut catalog = open_catalog(&dir, http, packages);
    catalog.refresh_from_sources().await.unwrap();

    catalog.set_override("wireshark", "forensics", "Memory").unwrap();
    drop(catalog);

    let (http, packages) = online_stubs();
    let mut reopened = open_catalog(&dir, http, packages);
    let record = reopened.get("wireshark").unwrap();
    assert_eq!(record.category, "forensics");
    assert_eq!(record.subcategory, "Memory");

    // Another full refresh must not undo the override.
    reopened.refresh_from_sources().await.unwrap();
    assert_eq!(reopened.get("wireshark").unwrap().category, "forensics");
}

#[tokio::test]
async fn test_stale_seed_snapshot_triggers_rediscovery() {
    let dir = TempDir::new().unwrap();
    let config = DiscoveryConfig::with_data_dir(dir.path());

    // A snapshot matching the built-in seed name-for-name is a truncated
    // prior run.
    let stale: Vec<ToolRecord> = SEED_ENTRIES
        .iter()
        .map(|(name, category)| {
            let mut record = ToolRecord::new(*name);
            record.category = category.to_string();
            record
        })
        .collect();
    CatalogRepository::new(config.snapshot_path()).save(&stale).unwrap();

    let (http, packages) = online_stubs();
    let mut catalog = open_catalog(&dir, http, packages);
    assert_eq!(catalog.len(), SEED_ENTRIES.len());

    catalog.refresh_from_sources().await.unwrap();
    let names: HashSet<&str> = catalog.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, HashSet::from(["nmap", "hydra", "wireshark"]));
}

#[tokio::test]
async fn test_fully_offline_first_run_seeds_catalog() {
    let dir = TempDir::new().unwrap();
    let (http, packages) = offline_stubs();
    let mut catalog = open_catalog(&dir, http, packages);

    let count = catalog.refresh_from_sources().await.unwrap();
    assert_eq!(count, SEED_ENTRIES.len());
    assert_eq!(catalog.get("sqlmap").unwrap().category, "database");
    // Seed records still pass through classification.
    assert_eq!(catalog.get("gophish").unwrap().category, "social");
    assert!(!catalog.get("gophish").unwrap().subcategory.is_empty());
}

#[tokio::test]
async fn test_meta_only_discovery_when_web_down() {
    let dir = TempDir::new().unwrap();
    let (_, packages) = online_stubs();
    let http = StubHttp {
        pages: HashMap::new(),
    };
    let mut catalog = open_catalog(&dir, http, packages);

    let count = catalog.refresh_from_sources().await.unwrap();
    assert_eq!(count, 2);
    let nmap = catalog.get("nmap").unwrap();
    assert_eq!(nmap.source, "meta-package");
    assert_eq!(nmap.category, "recon");
}
