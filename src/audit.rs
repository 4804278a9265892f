//! audit command: discover pages, extract their links, verify everything
//!
//! Report goes to stdout (or `--output`) as JSON or YAML; progress to stderr.

use crate::check_links::LinkVerifier;
use crate::classify::ContentClassifier;
use crate::config::AuditConfig;
use crate::extract::LinkExtractor;
use crate::http::HttpClient;
use crate::model::{AuditSummary, DiscoverySession, LinkRecord, Page, PageRecord, StoreUrl};
use crate::sources::{Resolver, SourceContext};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Args)]
pub struct AuditArgs {
    /// Store URL, e.g. https://mystore.myshopify.com
    #[arg(value_name = "STORE_URL")]
    pub store_url: String,

    /// Maximum number of links to verify
    #[arg(long, default_value = "100", env = "STOREFRONT_AUDIT_MAX_LINKS")]
    pub max_links: usize,

    /// Parallel link checks (1-20)
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u8).range(1..=20))]
    pub concurrency: u8,

    /// Timeout per link check in milliseconds
    #[arg(long, default_value = "10000", env = "STOREFRONT_AUDIT_TIMEOUT")]
    pub timeout: u64,

    /// Pause after each link check in milliseconds
    #[arg(long, default_value = "200", env = "STOREFRONT_AUDIT_DELAY")]
    pub delay: u64,

    /// Overall budget for link verification in seconds
    #[arg(long, default_value = "600")]
    pub budget: u64,

    /// Only discover pages; do not verify links
    #[arg(long)]
    pub skip_links: bool,

    /// Output format: json (default) or yaml
    #[arg(long, short, default_value = "json")]
    pub format: String,

    /// Write the report to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl AuditArgs {
    fn config(&self) -> AuditConfig {
        AuditConfig {
            check_timeout: Duration::from_millis(self.timeout),
            check_delay: Duration::from_millis(self.delay),
            max_links: self.max_links,
            concurrency: self.concurrency as usize,
            run_budget: Duration::from_secs(self.budget),
            ..AuditConfig::default()
        }
    }
}

/// What the reporting side consumes
#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub store_url: String,
    pub generated_at: String,
    pub summary: AuditSummary,
    pub pages: Vec<Page>,
    pub links: Vec<LinkRecord>,
    pub dead_links: Vec<LinkRecord>,
}

impl AuditReport {
    pub fn from_session(session: &DiscoverySession) -> Self {
        Self {
            store_url: session.store.base().to_string(),
            generated_at: Utc::now().to_rfc3339(),
            summary: session.summary(),
            pages: session.pages.clone(),
            links: session.link_records.clone(),
            dead_links: session.dead_links().cloned().collect(),
        }
    }
}

/// Run the audit command
pub async fn run_audit(args: AuditArgs) -> Result<()> {
    let store = StoreUrl::parse(&args.store_url).context("Invalid store URL")?;
    let config = args.config();

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, finishing up...");
            let _ = cancel_tx.send(true);
        }
    });

    let auditor = Auditor::new(store, config)?.with_cancellation(cancel_rx);
    let session = auditor.run(!args.skip_links).await;

    if session.pages.is_empty() {
        eprintln!("No pages found. The Storefront API may be disabled, the store may have no pages, or pages may be password protected.");
    }

    let report = AuditReport::from_session(&session);
    let output = match args.format.as_str() {
        "yaml" | "yml" => serde_yaml::to_string(&report)?,
        _ => serde_json::to_string_pretty(&report)?,
    };

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &output)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Report saved to {}", path.display());
        }
        None => println!("{}", output),
    }

    let summary = report.summary;
    eprintln!(
        "Done: {} pages ({} published), {}/{} links OK",
        summary.total_pages, summary.published_pages, summary.working_links, summary.checked_links
    );

    Ok(())
}

/// One audit session: resolver, extractor and verifier wired to a store
pub struct Auditor {
    ctx: SourceContext,
    resolver: Resolver,
    extractor: LinkExtractor,
    verifier: LinkVerifier,
}

impl Auditor {
    pub fn new(store: StoreUrl, config: AuditConfig) -> Result<Self> {
        let http = HttpClient::new(&config.user_agent)?;
        let verifier = LinkVerifier::new(http.clone(), store.clone(), ContentClassifier::default(), config.clone());

        Ok(Self {
            ctx: SourceContext { http, store, config },
            resolver: Resolver::default(),
            extractor: LinkExtractor::default(),
            verifier,
        })
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_extractor(mut self, extractor: LinkExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.verifier = self.verifier.with_cancellation(cancel);
        self
    }

    /// Resolve pages, analyze each one, then verify the collected links.
    /// Never fails; an empty session means nothing could be discovered.
    pub async fn run(&self, verify_links: bool) -> DiscoverySession {
        let mut session = DiscoverySession::new(self.ctx.store.clone());

        let records = self.resolver.resolve(&self.ctx).await;
        if records.is_empty() {
            warn!(store = %self.ctx.store.base(), "no pages found or unable to fetch pages");
            return session;
        }
        info!(pages = records.len(), "analyzing pages");

        for record in records {
            let page = self.analyze(record).await;
            session.add_page(page);
        }
        info!(links = session.links().len(), "unique links collected");

        if verify_links {
            session.link_records = self.verifier.check_all(session.links()).await;
        }

        session
    }

    async fn analyze(&self, record: PageRecord) -> Page {
        let links = self.extractor.extract(record.content(), self.ctx.store.base_url());
        let url = self.ctx.store.page_url(&record.handle);

        let accessible = if record.published {
            self.verifier.check_page(&url).await
        } else {
            false
        };

        Page {
            id: record.id,
            title: record.title,
            handle: record.handle,
            url,
            published: record.published,
            published_at: record.published_at,
            accessible,
            links,
        }
    }
}
