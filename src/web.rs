//! Web catalog discovery
//!
//! Discovers tool pages from the site index, then fetches and parses each
//! page through a bounded worker pool. The discovered URL list is cached
//! with a TTL so repeat runs skip the index fetch. Individual page failures
//! are logged and skipped; only a missing index with no usable cache is
//! surfaced to the caller.

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::DiscoveryConfig;
use crate::error::CatalogError;
use crate::fetch::HttpFetch;
use crate::model::ToolRecord;
use crate::parser;

/// Source tag stamped on records discovered from the web index.
pub const WEB_SOURCE: &str = "kali.org";

static TOOL_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/tools/([a-z0-9][a-z0-9+.\-]*)/?$").expect("valid tool path regex"));

static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid href regex"));

pub struct WebCatalogFetcher {
    http: Arc<dyn HttpFetch>,
    config: DiscoveryConfig,
    cache: CacheStore,
}

impl WebCatalogFetcher {
    pub fn new(http: Arc<dyn HttpFetch>, config: DiscoveryConfig, cache: CacheStore) -> Self {
        Self {
            http,
            config,
            cache,
        }
    }

    /// Discover tool records from the web index, skipping names already in
    /// `existing`. Page-level failures degrade to skips.
    pub async fn discover(
        &self,
        existing: &HashSet<String>,
    ) -> Result<Vec<ToolRecord>, CatalogError> {
        let urls = self.tool_urls().await?;
        info!(count = urls.len(), "discovered tool page urls");

        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let results: Arc<Mutex<(Vec<ToolRecord>, HashSet<String>)>> =
            Arc::new(Mutex::new((Vec::new(), existing.clone())));

        let tasks = urls.iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            let results = Arc::clone(&results);
            let http = Arc::clone(&self.http);
            let delay = self.config.delay();
            let url = url.clone();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let html = match http.fetch(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        warn!(url = %url, error = %e, "tool page fetch failed; skipping");
                        return;
                    }
                };
                let Some(record) = record_from_page(&url, &html) else {
                    debug!(url = %url, "no package name on page; skipping");
                    return;
                };
                let mut guard = results.lock().expect("discovery results poisoned");
                let (records, seen) = &mut *guard;
                if seen.insert(record.key()) {
                    records.push(record);
                }
            }
        });
        join_all(tasks).await;

        let mut guard = results.lock().expect("discovery results poisoned");
        let records = std::mem::take(&mut guard.0);
        info!(count = records.len(), "web discovery produced records");
        Ok(records)
    }

    /// The tool page URL list: from the TTL cache when fresh, otherwise from
    /// a fresh index fetch (which repopulates the cache).
    async fn tool_urls(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(urls) = self.cache.load_web_links(self.config.web_ttl_hours) {
            debug!(count = urls.len(), "using cached tool page urls");
            return Ok(urls);
        }
        let html = self.http.fetch(&self.config.index_url).await?;
        let urls = extract_tool_links(&html, &self.config.base_url);
        if urls.is_empty() {
            return Err(CatalogError::ParseFailure {
                location: format!("tool index {}", self.config.index_url),
            });
        }
        self.cache.save_web_links(&urls);
        Ok(urls)
    }
}

/// Tool page links from the index HTML: every href whose path is exactly
/// `/tools/<name>/`, resolved against the base URL, fragment stripped,
/// deduplicated in document order.
pub fn extract_tool_links(html: &str, base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for caps in HREF_RE.captures_iter(html) {
        let href = caps[1].split(['#', '?']).next().unwrap_or("");
        let Some(path) = tool_path(href, base) else {
            continue;
        };
        if let Some(slug) = TOOL_PATH_RE.captures(&path).map(|c| c[1].to_string()) {
            if slug == "all-tools" {
                continue;
            }
            let url = format!("{base}/tools/{slug}/");
            if seen.insert(slug) {
                urls.push(url);
            }
        }
    }
    urls
}

/// The path component of an href, accepting site-absolute paths and
/// absolute URLs under the configured base.
fn tool_path(href: &str, base: &str) -> Option<String> {
    if let Some(rest) = href.strip_prefix(base) {
        return Some(rest.to_string());
    }
    if href.starts_with('/') {
        return Some(href.to_string());
    }
    None
}

/// The slug segment of a tool page URL.
pub fn url_slug(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let slug = trimmed.rsplit('/').next()?;
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_lowercase())
    }
}

/// Build a record from one fetched page. The parsed name wins; the URL slug
/// is the fallback identity when the page parses but names nothing.
fn record_from_page(url: &str, html: &str) -> Option<ToolRecord> {
    let parsed = parser::parse_tool_page(html);
    let name = match &parsed {
        Some(page) => page.name.clone(),
        None => url_slug(url)?,
    };
    let mut record = ToolRecord::new(name);
    record.source = WEB_SOURCE.to_string();
    record
        .metadata
        .insert("url".to_string(), serde_json::Value::String(url.to_string()));
    if let Some(page) = parsed {
        if let Some(category) = page.category {
            record.category = category;
        }
        record.subpackages = page.subpackages;
    }
    record.normalize();
    Some(record)
}

#[cfg(test)]
mod web_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_tool_links_two_segment_shape() {
        let html = r#"
            <a href="/tools/nmap/">nmap</a>
            <a href="https://www.kali.org/tools/hydra/">hydra</a>
            <a href="/tools/nmap/#nmap-common">fragment dup</a>
            <a href="/tools/">index itself</a>
            <a href="/tools/all-tools/">listing</a>
            <a href="/docs/policy/">unrelated</a>
            <a href="https://elsewhere.example/tools/evil/">foreign host</a>
        "#;
        let urls = extract_tool_links(html, "https://www.kali.org");
        assert_eq!(
            urls,
            vec![
                "https://www.kali.org/tools/nmap/",
                "https://www.kali.org/tools/hydra/",
            ]
        );
    }

    #[test]
    fn test_extract_tool_links_dedupes_in_order() {
        let html = r#"
            <a href="/tools/hydra/">first</a>
            <a href="/tools/nmap/">second</a>
            <a href="/tools/hydra/">again</a>
        "#;
        let urls = extract_tool_links(html, "https://www.kali.org/");
        assert_eq!(
            urls,
            vec![
                "https://www.kali.org/tools/hydra/",
                "https://www.kali.org/tools/nmap/",
            ]
        );
    }

    #[test]
    fn test_url_slug() {
        assert_eq!(
            url_slug("https://www.kali.org/tools/Nmap/").as_deref(),
            Some("nmap")
        );
        assert_eq!(url_slug("https://"), None);
    }

    #[test]
    fn test_record_from_page_uses_slug_when_unnamed() {
        let record = record_from_page(
            "https://www.kali.org/tools/masscan/",
            "<html><body><p>nothing structured</p></body></html>",
        )
        .unwrap();
        assert_eq!(record.name, "masscan");
        assert_eq!(record.source, WEB_SOURCE);
    }

    #[test]
    fn test_record_from_page_carries_category_and_subpackages() {
        let html = r#"
            <html><body>
              <dl>
                <dt>Package</dt><dd>aircrack-ng</dd>
                <dt>Tags</dt><dd><a>wireless</a></dd>
              </dl>
              <a href="/tools/aircrack-ng/#airodump-ng">airodump-ng</a>
            </body></html>
        "#;
        let record = record_from_page("https://www.kali.org/tools/aircrack-ng/", html).unwrap();
        assert_eq!(record.name, "aircrack-ng");
        assert_eq!(record.category, "wireless");
        assert_eq!(record.subpackages, vec!["airodump-ng"]);
    }
}
