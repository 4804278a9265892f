//! storefront-audit CLI
//!
//! Finds a store's content pages and reports dead or empty links.
//! Works without Admin API credentials: falls back to sitemaps and probing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use storefront_audit::audit::{run_audit, AuditArgs};
use storefront_audit::check_links::{run_check_url, CheckUrlArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storefront-audit")]
#[command(author = "RoyalBit Inc.")]
#[command(version)]
#[command(about = "Storefront page discovery and dead-link audit")]
#[command(long_about = "Finds a store's content pages via the Storefront API, sitemaps, or common handles, then checks every linked URL for dead or empty pages.\n\nCommands:\n  audit       Discover pages and verify their links\n  check-url   Verify a single URL")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover pages and verify their links
    Audit(AuditArgs),
    /// Verify a single URL (status + content check)
    CheckUrl(CheckUrlArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "storefront_audit=debug"
    } else {
        "storefront_audit=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Audit(args) => run_audit(args).await,
        Commands::CheckUrl(args) => run_check_url(args).await,
    }
}
