//! Restock-Watch main entry point
//!
//! This is the command-line interface for the Restock-Watch availability checker.

use anyhow::Context;
use clap::Parser;
use restock_watch::config::{load_config_with_hash, Config};
use restock_watch::logging::{setup_logging, LogOptions};
use restock_watch::monitor::run_check;
use std::path::PathBuf;
use std::process::ExitCode;

/// Restock-Watch: a one-shot product availability checker
///
/// Fetches the configured product page once, and sends a Telegram message
/// when the item can be bought directly instead of through an agent.
/// Intended to be run periodically by cron or a systemd timer.
#[derive(Parser, Debug)]
#[command(name = "restock-watch")]
#[command(version = "1.0.0")]
#[command(about = "A one-shot product availability checker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print console logs as JSON lines
    #[arg(long)]
    json: bool,

    /// Directory for the rolling JSON log file
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Do not write a log file
    #[arg(long)]
    no_log_file: bool,

    /// Validate config and show what would be checked without sending requests
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.json,
        log_dir: (!cli.no_log_file).then(|| cli.log_dir.clone()),
    };

    // Held until exit so buffered file logs are flushed
    let _guard = match setup_logging(&options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(0);
    }

    let outcome = run_check(&config)
        .await
        .context("Failed to initialize the checker")?;
    tracing::info!("Program finished");

    Ok(outcome.exit_code())
}

/// Handles the --dry-run mode: validates config and shows what would be checked
fn handle_dry_run(config: &Config) {
    println!("=== Restock-Watch Dry Run ===\n");

    println!("Target:");
    println!("  URL: {}", config.target.url);
    println!("  Watching text: {}", config.target.watching_text);

    println!("\nFetch:");
    println!(
        "  Delay: {}s - {}s",
        config.fetch.min_delay, config.fetch.max_delay
    );
    println!("  Max attempts: {}", config.fetch.max_retries);
    println!("  Backoff factor: {}", config.fetch.backoff_factor);
    println!("  Timeout: {}s", config.fetch.timeout);
    println!("  User agents: {}", config.fetch.user_agents.len());
    println!("  Proxies (unused): {}", config.fetch.proxies.len());

    println!("\nSelectors:");
    println!("  Name: {}", config.selectors.name);
    println!("  Price: {}", config.selectors.price);
    println!("  Availability: {}", config.selectors.availability);

    println!("\nTelegram:");
    println!("  API base: {}", config.telegram.api_base);
    println!("  Chat ID: {}", config.telegram.chat_id);

    println!("\n✓ Configuration is valid");
}
