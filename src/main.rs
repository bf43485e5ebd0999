use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_consolidator::{
    config::Config,
    pipeline::Pipeline,
    playlist::serialize_playlist_with_diagnostics,
    sources::{load_playlists, HttpFetcher},
};

#[derive(Parser)]
#[command(name = "m3u-consolidator")]
#[command(version = "0.1.0")]
#[command(about = "Consolidates multiple IPTV playlists into one deduplicated, EPG-linked playlist")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Playlist inputs (file paths or URLs), appended to the configured ones
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,

    /// Output playlist path (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Enable liveness probing and drop dead streams
    #[arg(long)]
    check_liveness: bool,

    /// Enable quality probing
    #[arg(long)]
    check_quality: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("m3u_consolidator={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Consolidator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Override config with CLI arguments
    config.inputs.extend(cli.inputs);
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.check_liveness {
        config.probe.liveness_enabled = true;
    }
    if cli.check_quality {
        config.probe.quality_enabled = true;
    }

    if config.inputs.is_empty() {
        anyhow::bail!("No playlist inputs given (arguments or [inputs] in config)");
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch.timeout_seconds));

    info!("Loading {} playlist input(s)", config.inputs.len());
    let entries = load_playlists(&config.inputs, &fetcher).await?;
    info!("Loaded {} records total", entries.len());

    let pipeline = Pipeline::new(config.clone());
    let result = pipeline.run(entries, &fetcher).await?;

    let output = serialize_playlist_with_diagnostics(
        &result.entries,
        &result.unmatched,
        config.epg.report_threshold,
    );
    tokio::fs::write(&config.output, output).await?;

    info!(
        "Wrote {} records to {}",
        result.entries.len(),
        config.output.display()
    );

    Ok(())
}
