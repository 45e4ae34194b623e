//! Scrape command: listing, batch fetch and CSV export

use crate::batch::config::{DEFAULT_MAX_RETRIES, MAX_RETRIES_LIMIT};
use crate::batch::{BatchExecutor, OnErrorKind, RateLimiter, RequestGate, Unthrottled};
use crate::fetcher::api_config::DEFAULT_BASE_URL;
use crate::fetcher::{ApiConfig, DetailFetcher, HttpTransport, JsonTransport, ListingFetcher};
use crate::output::path::today;
use crate::output::{output_path, CsvVacancyWriter, OutputWriter, VacancyWriter};
use crate::pipeline::Pipeline;
use crate::{SearchQuery, DEFAULT_AREA_CODE};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::CliError;

/// Upper bound for --delay
const MAX_DELAY_SECS: f64 = 3600.0;

/// Parse and validate the delay between request starts, in seconds
fn parse_delay(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || value < 0.0 {
        return Err("delay must be a non-negative number of seconds".to_string());
    }
    if value > MAX_DELAY_SECS {
        return Err(format!("delay {value} exceeds maximum of {MAX_DELAY_SECS} seconds"));
    }
    Ok(value)
}

/// Vacancy scraper CLI
#[derive(Parser, Debug, Clone)]
#[command(name = "vacancy-scraper")]
#[command(about = "Fetch job vacancies from the hh.ru API into a CSV file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of listing pages to scrape (100 vacancies per page)
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Search text matched against vacancy names
    #[arg(short = 't', long = "text", default_value = "")]
    pub search_text: String,

    /// Output file name prefix; the date and .csv are appended
    #[arg(short, long = "output", default_value = "df")]
    pub output_name: String,

    /// Minimum delay between request starts, in seconds
    #[arg(short, long, default_value = "0.2", value_parser = parse_delay)]
    pub delay: f64,

    /// Region code (113 = Russia, 1001 = other regions)
    #[arg(long, default_value_t = DEFAULT_AREA_CODE)]
    pub area: u32,

    /// API root URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory the CSV file is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// What to do when a vacancy fetch fails: stop, abort or retry
    ///
    /// stop returns the vacancies fetched before the failure, abort writes
    /// nothing, retry re-attempts transient failures before stopping.
    #[arg(long, default_value = "stop")]
    pub on_error: OnErrorKind,

    /// Retries per vacancy when --on-error retry is used
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(1..=MAX_RETRIES_LIMIT as i64))]
    pub max_retries: u32,

    /// HTTP(S) proxy URL for all requests
    #[arg(long)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Run summary format (json or human)
    #[arg(long, default_value = "human")]
    pub output_format: OutputFormat,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Written CSV file
    pub output_path: PathBuf,
    /// URLs found by the listing
    pub discovered: usize,
    /// Rows written
    pub fetched: usize,
    /// URL whose failure stopped the batch
    pub failed_url: Option<String>,
    /// Error of that failure
    pub error: Option<String>,
    /// Whether the run was interrupted
    pub cancelled: bool,
    /// Wall time in seconds
    pub elapsed_secs: f64,
}

impl Cli {
    /// Search query described by the arguments
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.search_text.clone(), self.pages).with_area(self.area)
    }

    /// API settings described by the arguments
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout))
            .with_proxy(self.proxy.clone())
    }

    /// Run against the real API
    pub async fn execute(&self, cancel: CancellationToken) -> Result<RunSummary, CliError> {
        let transport = Arc::new(HttpTransport::new(&self.api_config())?);
        self.execute_with(transport, cancel).await
    }

    /// Run with a caller-supplied transport
    pub async fn execute_with(
        &self,
        transport: Arc<dyn JsonTransport>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, CliError> {
        let started = Instant::now();
        if self.output_name.contains(['/', '\\']) {
            return Err(CliError::InvalidArgument(format!(
                "output prefix '{}' must not contain a path separator; use --output-dir",
                self.output_name
            )));
        }

        let config = self.api_config();
        let query = self.query();

        let listing = ListingFetcher::new(transport.clone(), &config);
        let detail = Arc::new(DetailFetcher::new(transport));
        let gate: Arc<dyn RequestGate> = if self.delay > 0.0 {
            Arc::new(RateLimiter::fixed_interval(Duration::from_secs_f64(self.delay)))
        } else {
            Arc::new(Unthrottled)
        };
        let policy = self.on_error.into_policy(self.max_retries);

        let executor = BatchExecutor::new(detail, gate)
            .with_policy(policy)
            .with_cancellation(cancel)
            .with_progress(create_progress_bar(self.output_format));

        let report = Pipeline::new(listing, executor).run(&query).await?;

        if let Some(failure) = &report.batch.failure {
            warn!(
                "Stopped after failure of {}; keeping {} vacancies",
                failure.url,
                report.records().len()
            );
        }

        info!("saving to output file");
        let path = output_path(&self.output_dir, &self.output_name, today());
        let mut writer = CsvVacancyWriter::new(&path)?;
        writer.write_vacancies(report.records())?;
        writer.close()?;

        Ok(RunSummary {
            output_path: path,
            discovered: report.discovered,
            fetched: report.records().len(),
            failed_url: report.batch.failure.as_ref().map(|f| f.url.clone()),
            error: report.batch.failure.as_ref().map(|f| f.error.to_string()),
            cancelled: report.batch.cancelled,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }
}

/// Print the run summary
pub fn print_summary(format: OutputFormat, summary: &RunSummary) {
    match format {
        OutputFormat::Json => match serde_json::to_string(summary) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!("Failed to serialize run summary: {}", e),
        },
        OutputFormat::Human => {
            println!("\nVacancies found: {}", summary.discovered);
            println!("Vacancies saved: {}", summary.fetched);
            println!("Output: {}", summary.output_path.display());
            if let (Some(url), Some(error)) = (&summary.failed_url, &summary.error) {
                println!("Stopped early at {url}: {error}");
            }
            if summary.cancelled {
                println!("Interrupted: partial results saved");
            }
            println!("Executed in {:.2} seconds.", summary.elapsed_secs);
        }
    }
}

/// Running count of fetched vacancies
fn create_progress_bar(format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} vacancies")
            .expect("hardcoded template is valid")
            .progress_chars("#>-"),
    );
    pb
}
