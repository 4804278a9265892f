//! Page discovery: an ordered chain of sources, first non-empty answer wins
//!
//! - storefront_api: paginated GraphQL query against the public Storefront API
//! - sitemap: well-known sitemap documents, `/pages/` entries only
//! - known_handles: existence probes for handles most stores have

pub mod known_handles;
pub mod sitemap;
pub mod storefront_api;

use crate::config::AuditConfig;
use crate::error::StrategyError;
use crate::http::HttpClient;
use crate::model::{deslugify, PageRecord, StoreUrl};
use futures::future::BoxFuture;
use std::collections::HashSet;
use tracing::{info, warn};

pub use known_handles::KnownHandles;
pub use sitemap::Sitemap;
pub use storefront_api::StorefrontApi;

/// What every source gets to work with
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub http: HttpClient,
    pub store: StoreUrl,
    pub config: AuditConfig,
}

/// One discovery strategy
pub trait PageSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pages this source can see. An empty `Ok` means "nothing here", an
    /// `Err` means the source could not be queried; both fall through.
    fn attempt<'a>(&'a self, ctx: &'a SourceContext) -> BoxFuture<'a, Result<Vec<PageRecord>, StrategyError>>;
}

/// Runs sources in priority order
pub struct Resolver {
    sources: Vec<Box<dyn PageSource>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StorefrontApi),
            Box::new(Sitemap::default()),
            Box::new(KnownHandles::default()),
        ])
    }
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn PageSource>>) -> Self {
        Self { sources }
    }

    /// Records from the first source that yields any. Never fails: if every
    /// source comes up empty the result is empty.
    pub async fn resolve(&self, ctx: &SourceContext) -> Vec<PageRecord> {
        for source in &self.sources {
            info!(source = source.name(), "trying page source");

            match source.attempt(ctx).await {
                Ok(records) => {
                    let records = sanitize(records);
                    if !records.is_empty() {
                        info!(source = source.name(), pages = records.len(), "pages found");
                        return records;
                    }
                    info!(source = source.name(), "no pages, falling through");
                }
                Err(StrategyError::Forbidden) => {
                    warn!(source = source.name(), "access forbidden, trying next source");
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "source failed, trying next source");
                }
            }
        }

        warn!("no pages found by any source");
        Vec::new()
    }
}

/// Drop handle-less records, keep the first record per handle, and make
/// sure every title is non-empty.
fn sanitize(records: Vec<PageRecord>) -> Vec<PageRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|mut record| {
            record.handle = record.handle.trim().to_string();
            if record.handle.is_empty() || !seen.insert(record.handle.clone()) {
                return None;
            }
            if record.title.trim().is_empty() {
                record.title = deslugify(&record.handle);
            }
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::sync::{Arc, Mutex};

    type Outcome = Result<Vec<PageRecord>, StrategyError>;

    struct Scripted {
        name: &'static str,
        outcome: Mutex<Option<Outcome>>,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl PageSource for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn attempt<'a>(&'a self, _ctx: &'a SourceContext) -> BoxFuture<'a, Result<Vec<PageRecord>, StrategyError>> {
            Box::pin(async move {
                self.order.lock().unwrap().push(self.name);
                self.outcome.lock().unwrap().take().unwrap_or_else(|| Ok(vec![]))
            })
        }
    }

    fn ctx() -> SourceContext {
        SourceContext {
            http: HttpClient::new("test").unwrap(),
            store: StoreUrl::parse("https://shop.example").unwrap(),
            config: AuditConfig::default(),
        }
    }

    fn record(handle: &str, title: &str) -> PageRecord {
        PageRecord {
            id: format!("gid://{}", handle),
            title: title.to_string(),
            handle: handle.to_string(),
            published: true,
            published_at: None,
            body: String::new(),
            body_summary: String::new(),
        }
    }

    fn chain(outcomes: Vec<(&'static str, Outcome)>) -> (Resolver, Arc<Mutex<Vec<&'static str>>>) {
        let order = Arc::new(Mutex::new(Vec::new()));
        let sources = outcomes
            .into_iter()
            .map(|(name, outcome)| {
                Box::new(Scripted {
                    name,
                    outcome: Mutex::new(Some(outcome)),
                    order: Arc::clone(&order),
                }) as Box<dyn PageSource>
            })
            .collect();
        (Resolver::new(sources), order)
    }

    #[tokio::test]
    async fn test_first_non_empty_source_wins() {
        let (resolver, order) = chain(vec![
            ("api", Ok(vec![])),
            ("sitemap", Ok(vec![record("about", "About")])),
            ("probe", Ok(vec![record("faq", "FAQ")])),
        ]);

        let pages = resolver.resolve(&ctx()).await;
        assert_eq!(pages, vec![record("about", "About")]);
        assert_eq!(*order.lock().unwrap(), vec!["api", "sitemap"]);
    }

    #[tokio::test]
    async fn test_errors_fall_through() {
        let (resolver, order) = chain(vec![
            ("api", Err(StrategyError::Forbidden)),
            ("sitemap", Err(StrategyError::Fetch(FetchError::Timeout))),
            ("probe", Ok(vec![record("faq", "FAQ")])),
        ]);

        let pages = resolver.resolve(&ctx()).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(*order.lock().unwrap(), vec!["api", "sitemap", "probe"]);
    }

    #[tokio::test]
    async fn test_all_empty_is_not_an_error() {
        let (resolver, _) = chain(vec![
            ("api", Err(StrategyError::Parse("bad".into()))),
            ("sitemap", Ok(vec![])),
            ("probe", Ok(vec![])),
        ]);
        assert!(resolver.resolve(&ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn test_source_with_only_blank_handles_counts_as_empty() {
        let (resolver, _) = chain(vec![
            ("api", Ok(vec![record("  ", "Ghost")])),
            ("sitemap", Ok(vec![record("contact", "Contact")])),
        ]);
        let pages = resolver.resolve(&ctx()).await;
        assert_eq!(pages[0].handle, "contact");
    }

    #[test]
    fn test_sanitize_unique_handles_and_titles() {
        let records = vec![
            record("about", "About Us"),
            record("about", "About Again"),
            record("shipping-info", ""),
            record("", "No Handle"),
        ];
        let clean = sanitize(records);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].title, "About Us");
        assert_eq!(clean[1].title, "Shipping Info");

        let handles: HashSet<_> = clean.iter().map(|r| r.handle.as_str()).collect();
        assert_eq!(handles.len(), clean.len());
        assert!(clean.iter().all(|r| !r.title.is_empty()));
    }
}
