//! Usage-Drill main entry point
//!
//! This is the command-line interface for the incremental usage sync.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use usage_drill::config::{load_config_with_hash, Config};
use usage_drill::output::{load_statistics, print_statistics};
use usage_drill::storage::JsonStore;
use usage_drill::SyncRun;

/// Usage-Drill: incremental energy-usage sync
///
/// Logs into the utility portal, walks the usage history down to 15-minute
/// intervals, and forwards every day newer than the last delivered one to
/// Home Assistant.
#[derive(Parser, Debug)]
#[command(name = "usage-drill")]
#[command(version = "1.0.0")]
#[command(about = "Incremental energy-usage sync from a utility portal", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what a run would do without opening the portal
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show the persisted watermark and snapshot statistics and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e)
                .with_context(|| format!("loading {}", cli.config.display()));
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.status {
        handle_status(&config)?;
    } else {
        handle_sync(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("usage_drill=info,warn"),
            1 => EnvFilter::new("usage_drill=debug,info"),
            2 => EnvFilter::new("usage_drill=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Usage-Drill Dry Run ===\n");

    println!("Portal:");
    println!("  Login URL: {}", config.portal.login_url);
    println!("  Username: {}", config.portal.username);

    println!("\nWebDriver:");
    println!("  Endpoint: {}", config.webdriver.endpoint);
    println!("  Browser: {}", config.webdriver.browser);
    println!("  Headless: {}", config.webdriver.headless);

    println!("\nTimeouts:");
    println!("  Page load: {}s", config.timeouts.page_load_secs);
    println!("  Element: {}s", config.timeouts.element_secs);
    println!("  Show more: {}s", config.timeouts.show_more_secs);
    println!("  Login form: {}s", config.timeouts.login_secs);
    println!("  Delivery: {}s", config.timeouts.delivery_secs);
    println!("  Poll interval: {}ms", config.timeouts.poll_interval_ms);

    println!("\nTraversal:");
    println!("  Max reveals per view: {}", config.traversal.max_show_more);

    println!("\nSink:");
    println!("  URL: {}", config.sink.url);

    println!("\nStorage:");
    println!("  State: {}", config.storage.state_path);
    println!("  Data: {}", config.storage.data_path);

    println!("\nSync:");
    println!("  Order: {:?}", config.sync.order);
    println!("  Watermark policy: {:?}", config.sync.watermark_policy);

    println!("\n✓ Configuration is valid");
}

/// Handles the --status mode: shows what the store holds
fn handle_status(config: &Config) -> anyhow::Result<()> {
    println!("State: {}", config.storage.state_path);
    println!("Data: {}\n", config.storage.data_path);

    let store = JsonStore::from_config(&config.storage);
    let stats = load_statistics(&store).context("reading persisted state")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main sync operation
async fn handle_sync(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting sync (order: {:?}, watermark policy: {:?})",
        config.sync.order,
        config.sync.watermark_policy
    );

    match SyncRun::new(config).run().await {
        Ok(summary) => {
            if summary.is_clean() {
                tracing::info!("Sync completed successfully");
            } else {
                tracing::warn!("Sync completed with skipped subtrees or failed deliveries");
            }
            Ok(())
        }
        Err(e) => Err(e).context("sync run failed"),
    }
}
