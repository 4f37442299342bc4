//! rangebook - range strategy construction from the command line.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use rangebook_cli::{AppConfig, Command};
use rangebook_telemetry::Metrics;

/// Build and inspect two-sided range strategies.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (can also be set via RANGEBOOK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Print Prometheus metrics after the command finishes
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    rangebook_telemetry::init_logging()?;

    // CLI arg > RANGEBOOK_CONFIG env var > default
    let config_path = cli
        .config
        .or_else(|| std::env::var("RANGEBOOK_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::load(&config_path)?;
    info!(
        tokens = config.tokens.len(),
        fee_ppm = config.fee.trading_fee_ppm,
        "Configuration loaded"
    );

    let output = rangebook_cli::run(cli.command, &config).await?;
    println!("{output}");

    if cli.metrics {
        print!("{}", Metrics::render()?);
    }

    Ok(())
}
