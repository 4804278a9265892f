//! Storefront API source: cursor-paginated GraphQL `pages` query

use super::{PageSource, SourceContext};
use crate::error::{FetchError, StrategyError};
use crate::model::PageRecord;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const PAGES_QUERY: &str = r#"
query getPages($first: Int!, $cursor: String) {
  pages(first: $first, after: $cursor) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        title
        handle
        body
        bodySummary
        publishedAt
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<PagesData>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PagesData {
    pages: Option<PageConnection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageConnection {
    #[serde(default)]
    page_info: PageInfo,
    #[serde(default)]
    edges: Vec<PageEdge>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageEdge {
    node: PageNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageNode {
    id: String,
    #[serde(default)]
    title: String,
    handle: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    body_summary: Option<String>,
    published_at: Option<String>,
}

impl From<PageNode> for PageRecord {
    fn from(node: PageNode) -> Self {
        PageRecord {
            id: node.id,
            title: node.title,
            handle: node.handle,
            published: node.published_at.is_some(),
            published_at: node.published_at,
            body: node.body.unwrap_or_default(),
            body_summary: node.body_summary.unwrap_or_default(),
        }
    }
}

/// Public Storefront API at `/api/<version>/graphql.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct StorefrontApi;

impl StorefrontApi {
    async fn fetch_all(&self, ctx: &SourceContext) -> Result<Vec<PageRecord>, StrategyError> {
        let endpoint = ctx
            .store
            .join(&format!("/api/{}/graphql.json", ctx.config.api_version));
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request = json!({
                "query": PAGES_QUERY,
                "variables": {
                    "first": ctx.config.api_page_size(),
                    "cursor": cursor,
                },
            });

            let response: GraphQlResponse = ctx
                .http
                .post_json(&endpoint, &request, ctx.config.api_timeout)
                .await
                .map_err(|err| match err {
                    FetchError::Forbidden => StrategyError::Forbidden,
                    other => StrategyError::Fetch(other),
                })?;

            // Partial results survive a GraphQL-level error
            if let Some(errors) = response.errors {
                warn!(%errors, "storefront API returned errors");
                break;
            }

            let connection = response.data.and_then(|d| d.pages).unwrap_or_default();
            records.extend(connection.edges.into_iter().map(|edge| PageRecord::from(edge.node)));
            debug!(pages = records.len(), "fetched pages so far");

            if !ctx.config.api_delay.is_zero() {
                tokio::time::sleep(ctx.config.api_delay).await;
            }

            match connection.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(next),
                } => cursor = Some(next),
                _ => break,
            }
        }

        Ok(records)
    }
}

impl PageSource for StorefrontApi {
    fn name(&self) -> &'static str {
        "storefront-api"
    }

    fn attempt<'a>(&'a self, ctx: &'a SourceContext) -> BoxFuture<'a, Result<Vec<PageRecord>, StrategyError>> {
        Box::pin(self.fetch_all(ctx))
    }
}
