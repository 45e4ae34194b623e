//! Observability metrics for the vacancy scraper
//!
//! Counters and histograms for outbound requests, rate gate waits and batch
//! outcomes. Emission goes through the `metrics` facade, so every helper here
//! is a cheap no-op until [`init_metrics`] installs the Prometheus exporter.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Initialize the Prometheus exporter and register metric descriptions
///
/// Idempotent: later calls return `Ok(())` without rebinding.
///
/// # Arguments
/// * `addr` - Socket address of the scrape endpoint (e.g., "0.0.0.0:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        METRICS_INITIALIZED.store(false, Ordering::SeqCst);
        return Err(format!("Failed to install Prometheus exporter: {e}").into());
    }

    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the vacancy API"
    );

    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );

    describe_counter!(
        "http_retries_total",
        Unit::Count,
        "Total number of retry attempts"
    );

    describe_histogram!(
        "rate_limit_queue_wait_seconds",
        Unit::Seconds,
        "Time spent waiting at the rate gate"
    );

    describe_counter!(
        "vacancies_fetched_total",
        Unit::Count,
        "Vacancies fetched and parsed successfully"
    );

    describe_counter!(
        "vacancies_failed_total",
        Unit::Count,
        "Vacancy fetches that failed"
    );

    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Whether [`init_metrics`] has run
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.load(Ordering::SeqCst)
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Timing and outcome of one HTTP request
pub struct HttpRequestMetrics {
    endpoint: &'static str,
    start_time: Instant,
    correlation_id: String,
}

impl HttpRequestMetrics {
    /// Start recording a request against `endpoint` ("listing" or "detail")
    pub fn start(endpoint: &'static str) -> Self {
        let correlation_id = generate_correlation_id();
        debug!(correlation_id = %correlation_id, endpoint, "Starting HTTP request");

        Self {
            endpoint,
            start_time: Instant::now(),
            correlation_id,
        }
    }

    /// Record a response with `status_code`
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint,
            "status" => status_code.to_string(),
        )
        .increment(1);

        histogram!("http_request_duration_seconds", "endpoint" => self.endpoint)
            .record(duration.as_secs_f64());

        debug!(
            correlation_id = %self.correlation_id,
            endpoint = self.endpoint,
            status = status_code,
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    /// Record a request that produced no response
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint,
            "status" => "network_error",
        )
        .increment(1);

        histogram!("http_request_duration_seconds", "endpoint" => self.endpoint)
            .record(duration.as_secs_f64());

        warn!(
            correlation_id = %self.correlation_id,
            endpoint = self.endpoint,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Correlation ID of this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record a retry backoff before attempt number `attempt`
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!("http_retries_total", "attempt" => attempt.to_string()).increment(1);

    debug!(
        attempt,
        backoff_ms = duration.as_millis(),
        "Retry backoff recorded"
    );
}

/// Record how long a caller waited at the rate gate
pub fn record_gate_wait(wait: Duration) {
    histogram!("rate_limit_queue_wait_seconds").record(wait.as_secs_f64());
}

/// Record one finished vacancy fetch
pub fn record_vacancy_outcome(success: bool) {
    if success {
        counter!("vacancies_fetched_total").increment(1);
    } else {
        counter!("vacancies_failed_total").increment(1);
    }
}
