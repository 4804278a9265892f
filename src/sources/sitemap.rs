//! Sitemap source: `/pages/<handle>` entries from well-known sitemap documents

use super::{PageSource, SourceContext};
use crate::error::StrategyError;
use crate::model::{deslugify, handle_from_url, PageRecord};
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDoc {
    /// `<urlset>`: page locations
    UrlSet(Vec<String>),
    /// `<sitemapindex>`: child sitemap locations
    Index(Vec<String>),
}

/// Parse a sitemap or sitemap index in the standard namespace
pub fn parse_sitemap(xml: &str) -> Result<SitemapDoc, StrategyError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| StrategyError::Parse(e.to_string()))?;
    let root = doc.root_element();

    let (entry, is_index) = if root.has_tag_name((SITEMAP_NS, "sitemapindex")) {
        ("sitemap", true)
    } else if root.has_tag_name((SITEMAP_NS, "urlset")) {
        ("url", false)
    } else {
        return Err(StrategyError::Parse(format!(
            "unexpected root element <{}>",
            root.tag_name().name()
        )));
    };

    let locations = root
        .children()
        .filter(|n| n.has_tag_name((SITEMAP_NS, entry)))
        .filter_map(|n| n.children().find(|c| c.has_tag_name((SITEMAP_NS, "loc"))))
        .filter_map(|loc| loc.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    Ok(if is_index {
        SitemapDoc::Index(locations)
    } else {
        SitemapDoc::UrlSet(locations)
    })
}

/// Page records for every `/pages/` location, document order
pub fn page_records(locations: &[String]) -> Vec<PageRecord> {
    locations
        .iter()
        .filter(|url| url.contains("/pages/"))
        .filter_map(|url| handle_from_url(url))
        .map(|handle| PageRecord::synthesized(&handle, deslugify(&handle), String::new()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Sitemap {
    paths: Vec<String>,
}

impl Default for Sitemap {
    fn default() -> Self {
        Self::new(["/sitemap.xml", "/sitemap_pages.xml"])
    }
}

impl Sitemap {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    async fn fetch_doc(&self, ctx: &SourceContext, url: &str) -> Result<Option<SitemapDoc>, StrategyError> {
        let page = ctx.http.get(url, ctx.config.sitemap_timeout).await?;
        if page.status != 200 {
            debug!(url, status = page.status, "sitemap not available");
            return Ok(None);
        }
        parse_sitemap(&page.body).map(Some)
    }

    async fn pages_from(&self, ctx: &SourceContext, url: &str) -> Result<Vec<PageRecord>, StrategyError> {
        match self.fetch_doc(ctx, url).await? {
            None => Ok(Vec::new()),
            Some(SitemapDoc::UrlSet(locations)) => Ok(page_records(&locations)),
            Some(SitemapDoc::Index(children)) => {
                let mut records = Vec::new();
                for child in children.iter().filter(|c| c.contains("pages")) {
                    match self.fetch_doc(ctx, child).await {
                        Ok(Some(SitemapDoc::UrlSet(locations))) => records.extend(page_records(&locations)),
                        Ok(_) => {}
                        Err(err) => warn!(url = %child, error = %err, "could not read child sitemap"),
                    }
                }
                Ok(records)
            }
        }
    }

    async fn discover(&self, ctx: &SourceContext) -> Result<Vec<PageRecord>, StrategyError> {
        for path in &self.paths {
            let url = ctx.store.join(path);
            info!(url = %url, "trying sitemap");

            match self.pages_from(ctx, &url).await {
                Ok(records) if !records.is_empty() => {
                    info!(pages = records.len(), "pages found in sitemap");
                    return Ok(records);
                }
                Ok(_) => {}
                Err(err) => warn!(url = %url, error = %err, "could not parse sitemap"),
            }
        }
        Ok(Vec::new())
    }
}

impl PageSource for Sitemap {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn attempt<'a>(&'a self, ctx: &'a SourceContext) -> BoxFuture<'a, Result<Vec<PageRecord>, StrategyError>> {
        Box::pin(self.discover(ctx))
    }
}
