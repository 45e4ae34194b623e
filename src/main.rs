//! Main entry point for the vacancy-scraper CLI

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;
use vacancy_scraper::cli::{print_summary, Cli};

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vacancy_scraper=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = vacancy_scraper::metrics::init_metrics(addr) {
            error!("Metrics disabled: {}", e);
        }
    }

    // First Ctrl+C stops the run and keeps what was fetched; a second one exits
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - saving partial results...");
                cancel.cancel();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Second Ctrl+C received - exiting without saving");
                std::process::exit(130);
            }
        }
    });

    let result = cli
        .execute(cancel)
        .await
        .map_err(|e| anyhow::anyhow!(e));

    match result {
        Ok(summary) => print_summary(cli.output_format, &summary),
        Err(e) => {
            error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
