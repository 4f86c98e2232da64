//! Injected capabilities and their production implementations
//!
//! The fetchers and the catalog facade talk to the outside world through
//! two traits: [`HttpFetch`] for page retrieval and [`PackageQuery`] for
//! the package-manager surface. Tests inject mocks; production wires up
//! the reqwest client and apt-family process invocations, every call
//! carrying an explicit timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::config::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PROCESS_TIMEOUT_SECS};
use crate::error::CatalogError;

/// Raw page retrieval. Non-success statuses are failures; the caller
/// decides whether to degrade or skip.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError>;
}

/// The package-manager surface the catalog consumes.
#[async_trait]
pub trait PackageQuery: Send + Sync {
    /// Whether a single package is installed.
    async fn is_installed(&self, name: &str) -> bool;

    /// Every installed package name, from one listing call.
    async fn installed_packages(&self) -> HashSet<String>;

    /// Direct dependencies of a package.
    async fn dependencies(&self, name: &str) -> Vec<String>;

    /// Installed (or repository) size in bytes; 0 when unknown.
    async fn size(&self, name: &str) -> u64;

    /// Direct dependency names of a meta-group, for graph traversal.
    async fn dependency_listing(&self, meta_group: &str) -> Result<Vec<String>, CatalogError>;

    /// Short description, if the package manager knows one.
    async fn description(&self, name: &str) -> Option<String>;

    /// Drop any cached listing state so the next query re-reads the
    /// system. Stateless implementations need not override this.
    fn invalidate(&self) {}
}

/// Production HTTP fetcher backed by reqwest.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("arsenal/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::timeout(url.to_string(), DEFAULT_HTTP_TIMEOUT_SECS)
            } else {
                CatalogError::source_unavailable(url, e)
            }
        })?;
        if !response.status().is_success() {
            return Err(CatalogError::source_unavailable(
                url,
                format!("HTTP {}", response.status()),
            ));
        }
        response
            .text()
            .await
            .map_err(|e| CatalogError::source_unavailable(url, e))
    }
}

/// Production package queries over the apt/dpkg toolchain, with small
/// in-memory caches for dependency, size and description lookups.
pub struct AptQuery {
    installed: Mutex<Option<HashSet<String>>>,
    dependencies: Mutex<HashMap<String, Vec<String>>>,
    sizes: Mutex<HashMap<String, u64>>,
    descriptions: Mutex<HashMap<String, String>>,
}

impl AptQuery {
    pub fn new() -> Self {
        Self {
            installed: Mutex::new(None),
            dependencies: Mutex::new(HashMap::new()),
            sizes: Mutex::new(HashMap::new()),
            descriptions: Mutex::new(HashMap::new()),
        }
    }

    async fn refresh_installed(&self) -> HashSet<String> {
        let mut installed = HashSet::new();
        if let Ok(output) = run_command("dpkg", &["-l"], DEFAULT_PROCESS_TIMEOUT_SECS).await {
            for line in output.lines() {
                if let Some(rest) = line.strip_prefix("ii") {
                    if let Some(package) = rest.split_whitespace().next() {
                        // dpkg may report arch-qualified names (pkg:amd64)
                        let package = package.split(':').next().unwrap_or(package);
                        installed.insert(package.to_string());
                    }
                }
            }
        }
        debug!(count = installed.len(), "refreshed installed package listing");
        installed
    }

    async fn query_installed_size(&self, name: &str) -> u64 {
        let format_arg = "-f=${Installed-Size}";
        let Ok(output) = run_command("dpkg-query", &["-W", format_arg, name], 5).await else {
            return 0;
        };
        output
            .split_whitespace()
            .next()
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
            .unwrap_or(0)
    }

    async fn query_repo_size(&self, name: &str) -> u64 {
        let Ok(output) = run_command("apt-cache", &["show", name], 7).await else {
            return 0;
        };
        for line in output.lines() {
            if let Some(rest) = line.strip_prefix("Installed-Size:") {
                if let Some(kb) = rest.split_whitespace().next().and_then(|t| t.parse::<u64>().ok())
                {
                    return kb * 1024;
                }
            }
        }
        0
    }
}

impl Default for AptQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageQuery for AptQuery {
    async fn is_installed(&self, name: &str) -> bool {
        self.installed_packages().await.contains(name)
    }

    async fn installed_packages(&self) -> HashSet<String> {
        if let Some(cached) = self.installed.lock().expect("installed cache poisoned").clone() {
            return cached;
        }
        let fresh = self.refresh_installed().await;
        *self.installed.lock().expect("installed cache poisoned") = Some(fresh.clone());
        fresh
    }

    async fn dependencies(&self, name: &str) -> Vec<String> {
        if let Some(cached) = self
            .dependencies
            .lock()
            .expect("dependency cache poisoned")
            .get(name)
        {
            return cached.clone();
        }
        let deps = match self.dependency_listing(name).await {
            Ok(deps) => deps,
            Err(e) => {
                debug!(package = name, error = %e, "dependency lookup failed");
                Vec::new()
            }
        };
        self.dependencies
            .lock()
            .expect("dependency cache poisoned")
            .insert(name.to_string(), deps.clone());
        deps
    }

    async fn size(&self, name: &str) -> u64 {
        if let Some(cached) = self.sizes.lock().expect("size cache poisoned").get(name) {
            return *cached;
        }
        let mut size = self.query_installed_size(name).await;
        if size == 0 {
            size = self.query_repo_size(name).await;
        }
        self.sizes
            .lock()
            .expect("size cache poisoned")
            .insert(name.to_string(), size);
        size
    }

    async fn dependency_listing(&self, meta_group: &str) -> Result<Vec<String>, CatalogError> {
        let output = run_command(
            "apt-cache",
            &["depends", meta_group],
            DEFAULT_PROCESS_TIMEOUT_SECS,
        )
        .await?;
        Ok(parse_depends_output(&output))
    }

    async fn description(&self, name: &str) -> Option<String> {
        if let Some(cached) = self
            .descriptions
            .lock()
            .expect("description cache poisoned")
            .get(name)
        {
            return Some(cached.clone());
        }
        let output = run_command("apt-cache", &["show", name], 5).await.ok()?;
        let description = parse_description(&output)?;
        self.descriptions
            .lock()
            .expect("description cache poisoned")
            .insert(name.to_string(), description.clone());
        Some(description)
    }

    fn invalidate(&self) {
        *self.installed.lock().expect("installed cache poisoned") = None;
    }
}

/// Dependency names from `apt-cache depends` output: every `Depends:` or
/// `Recommends:` line, value after the colon.
pub fn parse_depends_output(output: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        let value = if let Some(rest) = line.strip_prefix("Depends:") {
            rest
        } else if let Some(rest) = line.strip_prefix("Recommends:") {
            rest
        } else {
            continue;
        };
        let name = value.trim().trim_matches(|c| c == '<' || c == '>');
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    names
}

/// First description paragraph from `apt-cache show` output. Prefers the
/// English variant and keeps at most three continuation lines.
pub fn parse_description(output: &str) -> Option<String> {
    let mut base: Option<String> = None;
    let mut continuation: Vec<String> = Vec::new();
    let mut capturing = false;
    for line in output.lines() {
        let field = line
            .strip_prefix("Description-en:")
            .or_else(|| line.strip_prefix("Description:"));
        if let Some(content) = field {
            if base.is_none() || line.starts_with("Description-en:") {
                base = Some(content.trim().to_string());
                continuation.clear();
                capturing = true;
            }
            continue;
        }
        if capturing {
            if let Some(rest) = line.strip_prefix(' ') {
                if continuation.len() < 3 {
                    continuation.push(rest.trim().to_string());
                }
            } else {
                break;
            }
        }
    }
    base.map(|mut text| {
        if !continuation.is_empty() {
            text.push(' ');
            text.push_str(&continuation.join(" "));
        }
        text
    })
}

/// Run one external command with a deadline, returning stdout. A non-zero
/// exit or an elapsed deadline is an error for this unit only.
async fn run_command(
    program: &str,
    args: &[&str],
    timeout_secs: u64,
) -> Result<String, CatalogError> {
    let future = Command::new(program).args(args).output();
    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), future)
        .await
        .map_err(|_| CatalogError::timeout(format!("{program} {}", args.join(" ")), timeout_secs))?
        .map_err(|e| CatalogError::source_unavailable(program, e))?;
    if !output.status.success() {
        return Err(CatalogError::source_unavailable(
            program,
            format!("exit code {}", output.status.code().unwrap_or(-1)),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
