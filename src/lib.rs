//! # Vacancy Scraper Library
//!
//! Fetches job vacancies from the hh.ru REST API and exports them as CSV.
//!
//! ## Features
//!
//! - **Paginated Discovery**: Walks the search endpoint and collects vacancy URLs
//! - **Concurrent Detail Fetch**: One task per vacancy, paced by a global rate gate
//! - **Explicit Failure Policy**: Stop-and-return-partial, abort, or retry-then-fail
//! - **Cancellation**: Outstanding requests are cancelled when a batch stops early
//! - **CSV Export**: Fixed column layout, one row per fetched vacancy
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vacancy_scraper::batch::{BatchExecutor, OnError, RateLimiter};
//! use vacancy_scraper::fetcher::{ApiConfig, DetailFetcher, HttpTransport, ListingFetcher};
//! use vacancy_scraper::pipeline::Pipeline;
//! use vacancy_scraper::SearchQuery;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::default();
//! let transport = Arc::new(HttpTransport::new(&config)?);
//! let listing = ListingFetcher::new(transport.clone(), &config);
//! let detail = Arc::new(DetailFetcher::new(transport));
//! let gate = Arc::new(RateLimiter::fixed_interval(Duration::from_millis(200)));
//! let executor = BatchExecutor::new(detail, gate).with_policy(OnError::StopAndReturnPartial);
//!
//! let report = Pipeline::new(listing, executor)
//!     .run(&SearchQuery::new("Rust", 1))
//!     .await?;
//! println!("fetched {} vacancies", report.records().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Transport, listing walker, detail fetcher and JSON parser
//! - [`batch`] - Rate gate and the concurrent fetch orchestrator
//! - [`pipeline`] - Listing followed by the detail batch
//! - [`output`] - CSV export and output file naming
//! - [`cli`] - Command line interface

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Concurrent detail fetching and rate limiting
pub mod batch;

/// CLI command implementations
pub mod cli;

/// Transport, listing and detail fetchers
pub mod fetcher;

/// Prometheus metrics
pub mod metrics;

/// CSV output writers
pub mod output;

/// Listing-then-batch pipeline
pub mod pipeline;

/// Number of items requested per listing page. The API caps this at 100.
pub const PAGE_SIZE: u32 = 100;

/// Default region code (113 is Russia, 1001 is "other regions").
pub const DEFAULT_AREA_CODE: u32 = 113;

/// Search parameters for the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free text matched against vacancy names
    pub search_text: String,
    /// Region code
    pub area_code: u32,
    /// Items per page
    pub page_size: u32,
    /// Maximum number of pages to walk
    pub max_pages: u32,
}

impl SearchQuery {
    /// Create a query with the default area and page size
    pub fn new(search_text: impl Into<String>, max_pages: u32) -> Self {
        Self {
            search_text: search_text.into(),
            area_code: DEFAULT_AREA_CODE,
            page_size: PAGE_SIZE,
            max_pages,
        }
    }

    /// Override the region code
    pub fn with_area(mut self, area_code: u32) -> Self {
        self.area_code = area_code;
        self
    }

    /// Query parameters for one listing page
    pub fn page_params(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("text", format!("NAME:{}", self.search_text)),
            ("area", self.area_code.to_string()),
            ("page", page.to_string()),
            ("per_page", self.page_size.to_string()),
        ]
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Detail URLs in the order the API returned them
    pub items: Vec<String>,
    /// Zero-based index of this page
    pub page_index: u32,
    /// Total pages reported by the server
    pub total_pages: u32,
}

impl ListingPage {
    /// Whether the server reports no pages after this one
    pub fn is_last(&self) -> bool {
        self.total_pages.saturating_sub(self.page_index) <= 1
    }
}

/// A fully parsed vacancy, one row of the export
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyRecord {
    /// Vacancy title
    pub title: String,
    /// Public page of the vacancy
    pub canonical_url: String,
    /// Publication timestamp with the server's offset
    pub published_at: DateTime<FixedOffset>,
    /// Whether applying requires a test
    pub has_test: bool,
    /// Lower salary bound
    pub salary_from: Option<Decimal>,
    /// Upper salary bound
    pub salary_to: Option<Decimal>,
    /// Salary currency code
    pub currency: Option<String>,
    /// Required experience
    pub experience_level: String,
    /// Work schedule
    pub schedule_type: String,
    /// Key skills
    pub skills: BTreeSet<String>,
    /// Employer name
    pub employer_name: String,
    /// Region name
    pub area_name: String,
    /// Description with HTML tags removed
    pub description: String,
}

impl VacancyRecord {
    /// Skills joined with `;`
    pub fn skills_joined(&self) -> String {
        self.skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Whether any salary information is present
    pub fn has_salary(&self) -> bool {
        self.salary_from.is_some() || self.salary_to.is_some()
    }
}
