//! Link verification: transport status plus a content check for 200 responses
//!
//! The `check-url` command prints one compact JSON record.

use crate::classify::ContentClassifier;
use crate::config::AuditConfig;
use crate::http::HttpClient;
use crate::model::{LinkRecord, StoreUrl};
use anyhow::{Context, Result};
use clap::Args;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Error text for a 200 response that carries no real content
pub const NO_CONTENT_REASON: &str = "No meaningful content (empty page)";

#[derive(Args)]
pub struct CheckUrlArgs {
    /// URL to check
    #[arg(value_name = "URL")]
    url: String,

    /// Store the URL belongs to (for internal/external classification)
    #[arg(long, env = "STOREFRONT_AUDIT_STORE")]
    store: Option<String>,

    /// Timeout per request in milliseconds
    #[arg(long, default_value = "10000")]
    timeout: u64,
}

/// Run the check-url command
pub async fn run_check_url(args: CheckUrlArgs) -> Result<()> {
    let store = StoreUrl::parse(args.store.as_deref().unwrap_or(&args.url)).context("Invalid URL")?;

    let config = AuditConfig {
        check_timeout: Duration::from_millis(args.timeout),
        ..AuditConfig::default()
    };
    let http = HttpClient::new(&config.user_agent)?;
    let verifier = LinkVerifier::new(http, store, ContentClassifier::default(), config);

    let record = verifier.check(&args.url).await;
    println!("{}", serde_json::to_string(&record)?);

    eprintln!("Done: {}", if record.is_dead { "dead" } else { "alive" });

    Ok(())
}

/// Decides alive/dead for links and pages of one store
pub struct LinkVerifier {
    http: HttpClient,
    store: StoreUrl,
    classifier: ContentClassifier,
    config: AuditConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl LinkVerifier {
    pub fn new(http: HttpClient, store: StoreUrl, classifier: ContentClassifier, config: AuditConfig) -> Self {
        Self {
            http,
            store,
            classifier,
            config,
            cancel: None,
        }
    }

    /// Stop batch checks once the flag turns `true`
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn is_internal(&self, url: &str) -> bool {
        url.contains(self.store.domain()) || url.starts_with('/')
    }

    /// Verdict for one link
    pub async fn check(&self, url: &str) -> LinkRecord {
        let is_internal = self.is_internal(url);
        let timeout = self.config.check_timeout;

        let status = match self.http.head(url, timeout).await {
            Ok(status) => status,
            Err(err) => return LinkRecord::from_error(url, &err, is_internal),
        };

        if status == 200 {
            match self.http.get(url, timeout).await {
                Ok(page) if page.status == 200 => {
                    if !self.classifier.is_meaningful(&page.body) {
                        return LinkRecord::dead_with_reason(url, status, NO_CONTENT_REASON, is_internal);
                    }
                }
                Ok(page) => debug!(url, status = page.status, "content fetch disagreed with HEAD"),
                // The 200 already observed stands
                Err(err) => debug!(url, error = %err, "content fetch failed"),
            }
        }

        LinkRecord::from_status(url, status, is_internal)
    }

    /// Whether a page answers 200 to an existence check. No content check:
    /// placeholder pages that redirect somewhere live still count.
    pub async fn check_page(&self, url: &str) -> bool {
        match self.http.head(url, self.config.check_timeout).await {
            Ok(status) => status == 200,
            Err(err) => {
                debug!(url, error = %err, "page check failed");
                false
            }
        }
    }

    /// Check up to `max_links` links with bounded concurrency. Stops early on
    /// cancellation or when the run budget runs out; records collected so
    /// far are returned either way. Result order is not significant.
    pub async fn check_all(&self, links: &[String]) -> Vec<LinkRecord> {
        let targets: Vec<&String> = links.iter().take(self.config.max_links).collect();
        let total = targets.len();
        if total < links.len() {
            info!(total = links.len(), checking = total, "link cap reached");
        }
        info!(total, concurrency = self.config.concurrency, "checking links");

        let delay = self.config.check_delay;
        let checks = stream::iter(targets.into_iter().enumerate())
            .map(|(i, url)| async move {
                debug!("[{}/{}] checking {}", i + 1, total, truncate(url, 60));
                let record = self.check(url).await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                record
            })
            .buffer_unordered(self.config.concurrency.max(1));
        let mut checks = std::pin::pin!(checks);

        let deadline = tokio::time::sleep(self.config.run_budget);
        tokio::pin!(deadline);
        let mut cancel = self.cancel.clone();

        let mut results = Vec::with_capacity(total);
        loop {
            tokio::select! {
                next = checks.next() => match next {
                    Some(record) => results.push(record),
                    None => break,
                },
                _ = &mut deadline => {
                    warn!(checked = results.len(), total, "run budget exhausted, stopping link checks");
                    break;
                }
                _ = cancelled(&mut cancel) => {
                    warn!(checked = results.len(), total, "cancelled, stopping link checks");
                    break;
                }
            }
        }

        results
    }
}

/// Resolves once the flag is set; never resolves without a receiver or
/// after the sender is gone.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
    std::future::pending::<()>().await
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
