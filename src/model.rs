//! Audit data model: discovered pages, link verdicts, and the per-run session

use crate::error::FetchError;
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// Raw page as produced by a discovery strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub published: bool,
    pub published_at: Option<String>,
    pub body: String,
    pub body_summary: String,
}

impl PageRecord {
    /// Record for a page found without API metadata (sitemap, probing)
    pub fn synthesized(handle: &str, title: String, body: String) -> Self {
        Self {
            id: format!("page_{}", handle),
            title,
            handle: handle.to_string(),
            published: true,
            published_at: None,
            body,
            body_summary: String::new(),
        }
    }

    /// Text the link extractor should read
    pub fn content(&self) -> &str {
        if self.body.trim().is_empty() {
            &self.body_summary
        } else {
            &self.body
        }
    }
}

/// A discovered page after analysis
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub url: String,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Existence check against `url`; only run for published pages
    pub accessible: bool,
    pub links: Vec<String>,
}

/// Verdict for one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub is_dead: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub is_internal: bool,
}

impl LinkRecord {
    pub fn from_status(url: &str, status: u16, is_internal: bool) -> Self {
        Self {
            url: url.to_string(),
            status: Some(status),
            is_dead: status >= 400,
            error: None,
            is_internal,
        }
    }

    /// Transport failure: dead, no status
    pub fn from_error(url: &str, err: &FetchError, is_internal: bool) -> Self {
        Self {
            url: url.to_string(),
            status: None,
            is_dead: true,
            error: Some(err.reason()),
            is_internal,
        }
    }

    /// Reachable but judged dead for a content reason
    pub fn dead_with_reason(url: &str, status: u16, reason: &str, is_internal: bool) -> Self {
        Self {
            url: url.to_string(),
            status: Some(status),
            is_dead: true,
            error: Some(reason.to_string()),
            is_internal,
        }
    }
}

/// Normalized store location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUrl {
    base: Url,
    domain: String,
}

impl StoreUrl {
    /// Reduce any store URL to scheme://host[:port]
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(input.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", input, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!("{}: not an http(s) URL", input)));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("{}: missing host", input)))?;

        let domain = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let base = Url::parse(&format!("{}://{}/", parsed.scheme(), domain))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        Ok(Self { base, domain })
    }

    /// `scheme://host[:port]` without a trailing slash
    pub fn base(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Host (with port when explicit) used for internal-link detection
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.base(), path)
    }

    pub fn page_url(&self, handle: &str) -> String {
        self.join(&format!("/pages/{}", handle))
    }
}

/// State of one audit invocation
#[derive(Debug, Clone)]
pub struct DiscoverySession {
    pub store: StoreUrl,
    pub pages: Vec<Page>,
    links: Vec<String>,
    seen: HashSet<String>,
    pub link_records: Vec<LinkRecord>,
}

impl DiscoverySession {
    pub fn new(store: StoreUrl) -> Self {
        Self {
            store,
            pages: Vec::new(),
            links: Vec::new(),
            seen: HashSet::new(),
            link_records: Vec::new(),
        }
    }

    /// Add a page and fold its links into the session-wide set
    pub fn add_page(&mut self, page: Page) {
        for link in &page.links {
            let key = link.trim().to_lowercase();
            if self.seen.insert(key) {
                self.links.push(link.trim().to_string());
            }
        }
        self.pages.push(page);
    }

    /// Unique links across all pages, in first-seen order
    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn summary(&self) -> AuditSummary {
        let published = self.pages.iter().filter(|p| p.published).count();
        let dead = self.link_records.iter().filter(|l| l.is_dead).count();
        let internal = self.link_records.iter().filter(|l| l.is_internal).count();

        AuditSummary {
            total_pages: self.pages.len(),
            published_pages: published,
            unpublished_pages: self.pages.len() - published,
            accessible_pages: self.pages.iter().filter(|p| p.accessible).count(),
            total_links: self.links.len(),
            checked_links: self.link_records.len(),
            working_links: self.link_records.len() - dead,
            dead_links: dead,
            internal_links: internal,
            external_links: self.link_records.len() - internal,
        }
    }

    pub fn dead_links(&self) -> impl Iterator<Item = &LinkRecord> {
        self.link_records.iter().filter(|l| l.is_dead)
    }
}

/// Counts for the report header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub total_pages: usize,
    pub published_pages: usize,
    pub unpublished_pages: usize,
    pub accessible_pages: usize,
    pub total_links: usize,
    pub checked_links: usize,
    pub working_links: usize,
    pub dead_links: usize,
    pub internal_links: usize,
    pub external_links: usize,
}

/// `privacy-policy` -> `Privacy Policy`
pub fn deslugify(handle: &str) -> String {
    handle
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Handle from a `.../pages/<handle>` URL, if it has one
pub fn handle_from_url(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    let (_, rest) = path.rsplit_once("/pages/")?;
    let handle = rest.trim_matches('/');
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}
