//! storefront-audit: page discovery and dead-link audit for storefronts
//!
//! Pipeline:
//! - sources: find the store's content pages (API, sitemap, known handles)
//! - extract: pull outbound links from page bodies
//! - check_links: verify each link, using classify for 200 responses
//! - audit: wire the above into one session and report

pub mod audit;
pub mod check_links;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod model;
pub mod sources;

pub use audit::{AuditReport, Auditor};
pub use check_links::{LinkVerifier, NO_CONTENT_REASON};
pub use classify::{BoilerplateRules, ContentClassifier, Verdict};
pub use config::AuditConfig;
pub use error::{FetchError, StrategyError};
pub use extract::{ExclusionList, LinkExtractor};
pub use http::HttpClient;
pub use model::{AuditSummary, DiscoverySession, LinkRecord, Page, PageRecord, StoreUrl};
pub use sources::{PageSource, Resolver, SourceContext};
