//! Page Analyzer main entry point
//!
//! This is the command-line interface for the Page Analyzer service.

use clap::Parser;
use page_analyzer::config::{load_config_with_hash, Config};
use page_analyzer::server::serve;
use page_analyzer::Analyzer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page Analyzer: structural inspection of a single web page
///
/// Serves `GET /analyze?url=...`, which checks that the page is reachable,
/// then reports its title, heading counts, link accessibility and whether
/// it contains a login form.
#[derive(Parser, Debug)]
#[command(name = "page-analyzer")]
#[command(version = "1.0.0")]
#[command(about = "Structural inspection of a single web page", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the resolved settings without serving
    #[arg(long, conflicts_with = "analyze")]
    dry_run: bool,

    /// Analyze a single URL, print the JSON report and exit
    #[arg(long, value_name = "URL", conflicts_with = "dry_run")]
    analyze: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = match load_config_with_hash(cli.config.as_deref()) {
        Ok((cfg, hash)) => {
            match hash {
                Some(hash) => tracing::info!("Configuration loaded successfully (hash: {})", hash),
                None => tracing::info!("Using default configuration"),
            }
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(url) = cli.analyze.as_deref() {
        handle_analyze(&config, url).await?;
    } else {
        handle_serve(&config).await?;
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
            0 => EnvFilter::new("page_analyzer=info,warn"),
            1 => EnvFilter::new("page_analyzer=debug,info"),
            2 => EnvFilter::new("page_analyzer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Page Analyzer Dry Run ===\n");

    println!("Server:");
    println!("  Address: {}:{}", config.server.address, config.server.port);

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Delay between attempts: {}s", config.retry.delay_secs);

    println!("\nFetch:");
    println!(
        "  Request timeout: {}s",
        config.fetch.request_timeout_secs
    );
    println!(
        "  Connect timeout: {}s",
        config.fetch.connect_timeout_secs
    );
    match config.analysis_deadline() {
        Some(deadline) => println!("  Analysis deadline: {}s", deadline.as_secs()),
        None => println!("  Analysis deadline: none"),
    }

    println!("\nRequest headers:");
    println!("  User-Agent: {}", config.user_agent.user_agent);
    println!("  Accept: {}", config.user_agent.accept);
    println!("  Accept-Language: {}", config.user_agent.accept_language);

    println!("\n=== Dry run complete. Configuration is valid. ===");
}

/// Handles the --analyze mode: one analysis, report on stdout
async fn handle_analyze(config: &Config, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = Analyzer::from_config(config)?;

    match analyzer.analyze(url).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Analysis failed ({}): {}", e.kind, e);
            Err(e.into())
        }
    }
}

/// Handles the default mode: serve the HTTP API
async fn handle_serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = Analyzer::from_config(config)?;
    let policy = analyzer.policy();
    tracing::info!(
        "Retry policy: {} attempts, {:?} apart",
        policy.max_attempts(),
        policy.delay()
    );

    serve(&config.server, analyzer).await?;
    Ok(())
}
