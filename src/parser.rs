//! Tool page parser
//!
//! Extracts a package name, a coarse category guess and related package
//! names from one fetched HTML document. Extraction strategies are tried in
//! a fixed order and the first hit wins:
//!
//! 1. structured `<dl><dt>Package/Tool/Name</dt><dd>value</dd>` pairs
//! 2. a `<meta name="package">` tag
//! 3. an embedded JSON-LD block's `name`/`headline`
//! 4. a free-text `Package: <name>` search
//!
//! Malformed input yields `None`; nothing here panics or surfaces errors.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::taxonomy::PAGE_TAG_CATEGORIES;

/// Everything the parser can learn from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// Primary package name, lowercased
    pub name: String,

    /// Category guess from page tags; `None` when the page carries no tags
    pub category: Option<String>,

    /// Related packages referenced as same-page fragment links
    pub subpackages: Vec<String>,
}

static PACKAGE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9+.\-]{2,}$").expect("valid package name regex"));

static PACKAGE_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Package\s*:\s*([a-z0-9][a-z0-9+.\-]+)").expect("valid package field regex")
});

static FRAGMENT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/tools/[a-z0-9][a-z0-9+.\-]*/#([a-z0-9][a-z0-9+.\-]+)$")
        .expect("valid fragment link regex")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid css selector")
}

/// Parse one tool page. Returns `None` when no package name can be found.
pub fn parse_tool_page(html: &str) -> Option<ParsedPage> {
    let document = Html::parse_document(html);

    let name = extract_name(&document)?;
    let category = extract_category(&document);
    let subpackages = extract_subpackages(&document, &name);

    Some(ParsedPage {
        name,
        category,
        subpackages,
    })
}

fn extract_name(document: &Html) -> Option<String> {
    // Strategy 1: definition-list field pairs.
    for (label, value) in definition_pairs(document) {
        if matches!(label.as_str(), "package" | "tool" | "name") {
            let candidate = value.to_lowercase();
            if PACKAGE_NAME_RE.is_match(&candidate) {
                return Some(candidate);
            }
        }
    }

    // Strategy 2: metadata tag.
    let meta_selector = selector(r#"meta[name="package"]"#);
    if let Some(meta) = document.select(&meta_selector).next() {
        if let Some(content) = meta.value().attr("content") {
            let candidate = content.trim().to_lowercase();
            if PACKAGE_NAME_RE.is_match(&candidate) {
                return Some(candidate);
            }
        }
    }

    // Strategy 3: JSON-LD structured data.
    let ld_selector = selector(r#"script[type="application/ld+json"]"#);
    for script in document.select(&ld_selector) {
        let raw = script.text().collect::<String>();
        let Ok(data) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        let candidate = data
            .get("name")
            .and_then(|v| v.as_str())
            .or_else(|| data.get("headline").and_then(|v| v.as_str()));
        if let Some(candidate) = candidate {
            let candidate = candidate.trim().to_lowercase();
            if PACKAGE_NAME_RE.is_match(&candidate) {
                return Some(candidate);
            }
        }
    }

    // Strategy 4: free-text field search.
    let text = document.root_element().text().collect::<Vec<_>>().join("\n");
    PACKAGE_FIELD_RE
        .captures(&text)
        .map(|caps| caps[1].to_lowercase())
}

/// Scan page tags against the fixed keyword table. Tags with no match map
/// to "other"; no tags at all leaves the category unresolved.
fn extract_category(document: &Html) -> Option<String> {
    let tags = extract_tags(document);
    if tags.is_empty() {
        return None;
    }
    for tag in &tags {
        for (keyword, category) in PAGE_TAG_CATEGORIES {
            if tag.contains(keyword) {
                return Some((*category).to_string());
            }
        }
    }
    Some("other".to_string())
}

fn extract_tags(document: &Html) -> Vec<String> {
    let mut tags = Vec::new();

    // Definition-list rows labeled Category/Tags.
    let dl_selector = selector("dl");
    let dt_selector = selector("dt");
    let link_selector = selector("a");
    for dl in document.select(&dl_selector) {
        for dt in dl.select(&dt_selector) {
            let label = element_text(&dt).to_lowercase();
            if !(label.contains("category") || label.contains("tag")) {
                continue;
            }
            if let Some(dd) = following_dd(&dt) {
                collect_tag_texts(&dd, &link_selector, &mut tags);
            }
        }
    }

    // Fallback: a tag-cloud container.
    if tags.is_empty() {
        let cloud_selector = selector(
            r#"[class*="tag-cloud"], [class*="category-cloud"], #tags, #categories"#,
        );
        for cloud in document.select(&cloud_selector) {
            for link in cloud.select(&link_selector) {
                let text = element_text(&link).to_lowercase();
                if !text.is_empty() {
                    tags.push(text);
                }
            }
        }
    }

    // Fallback: table rows whose header mentions Category/Tags.
    if tags.is_empty() {
        let row_selector = selector("tr");
        let cell_selector = selector("th, td");
        for row in document.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if cells.len() < 2 {
                continue;
            }
            let header = element_text(&cells[0]).to_lowercase();
            if header.contains("category") || header.contains("tag") {
                collect_tag_texts(&cells[1], &link_selector, &mut tags);
            }
        }
    }

    tags
}

/// Related packages are same-page fragment links, excluding the primary
/// name, deduplicated in order.
fn extract_subpackages(document: &Html, name: &str) -> Vec<String> {
    let link_selector = selector("a[href]");
    let mut seen = std::collections::HashSet::new();
    let mut subpackages = Vec::new();
    for link in document.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(caps) = FRAGMENT_LINK_RE.captures(href) else {
            continue;
        };
        let sub = caps[1].to_lowercase();
        if sub != name && seen.insert(sub.clone()) {
            subpackages.push(sub);
        }
    }
    subpackages
}

/// (label, value) pairs from every definition list, pairing each `<dt>`
/// with the `<dd>` that follows it.
fn definition_pairs(document: &Html) -> Vec<(String, String)> {
    let dl_selector = selector("dl");
    let dt_selector = selector("dt");
    let mut pairs = Vec::new();
    for dl in document.select(&dl_selector) {
        for dt in dl.select(&dt_selector) {
            let label = element_text(&dt).to_lowercase();
            if let Some(dd) = following_dd(&dt) {
                pairs.push((label, element_text(&dd)));
            }
        }
    }
    pairs
}

/// The first `<dd>` element sibling after a `<dt>`.
fn following_dd<'a>(dt: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut node = dt.next_sibling();
    while let Some(current) = node {
        if let Some(element) = ElementRef::wrap(current) {
            let tag = element.value().name();
            if tag == "dd" {
                return Some(element);
            }
            if tag == "dt" {
                return None;
            }
        }
        node = current.next_sibling();
    }
    None
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Tag texts from a container: prefer link texts, else split the raw text
/// on commas and semicolons.
fn collect_tag_texts(container: &ElementRef, link_selector: &Selector, tags: &mut Vec<String>) {
    let links: Vec<String> = container
        .select(link_selector)
        .map(|a| element_text(&a).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if links.is_empty() {
        let raw = element_text(container).to_lowercase();
        tags.extend(
            raw.split([';', ','])
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        );
    } else {
        tags.extend(links);
    }
}
