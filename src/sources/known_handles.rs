//! Last-resort source: probe handles most stores publish

use super::{PageSource, SourceContext};
use crate::error::StrategyError;
use crate::model::{deslugify, PageRecord};
use futures::future::BoxFuture;
use scraper::{Html, Selector};
use tracing::{debug, info};

pub const DEFAULT_HANDLES: &[&str] = &[
    "about",
    "about-us",
    "contact",
    "privacy-policy",
    "terms-of-service",
    "shipping",
    "returns",
    "faq",
    "help",
    "blog",
];

#[derive(Debug, Clone)]
pub struct KnownHandles {
    handles: Vec<String>,
}

impl Default for KnownHandles {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLES.iter().copied())
    }
}

impl KnownHandles {
    pub fn new<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            handles: handles.into_iter().map(Into::into).collect(),
        }
    }

    async fn probe(&self, ctx: &SourceContext) -> Result<Vec<PageRecord>, StrategyError> {
        let mut found = Vec::new();

        for handle in &self.handles {
            let url = ctx.store.page_url(handle);
            match ctx.http.head(&url, ctx.config.probe_timeout).await {
                Ok(200) => {}
                Ok(status) => {
                    debug!(handle = %handle, status, "handle not present");
                    continue;
                }
                Err(err) => {
                    debug!(handle = %handle, error = %err, "probe failed");
                    continue;
                }
            }

            let body = match ctx.http.get(&url, ctx.config.check_timeout).await {
                Ok(page) if page.status == 200 => page.body,
                _ => String::new(),
            };
            let title = page_title(&body).unwrap_or_else(|| deslugify(handle));

            info!(handle = %handle, title = %title, "found page");
            found.push(PageRecord::synthesized(handle, title, body));
        }

        Ok(found)
    }
}

impl PageSource for KnownHandles {
    fn name(&self) -> &'static str {
        "known-handles"
    }

    fn attempt<'a>(&'a self, ctx: &'a SourceContext) -> BoxFuture<'a, Result<Vec<PageRecord>, StrategyError>> {
        Box::pin(self.probe(ctx))
    }
}

/// Text of the document `<title>`, if present and non-blank
fn page_title(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let doc = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
