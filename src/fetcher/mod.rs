//! Vacancy fetcher implementations
//!
//! - [`http`] - reqwest-backed [`JsonTransport`]
//! - [`listing`] - walks the paginated search endpoint
//! - [`detail`] - fetches and parses one vacancy
//! - [`parser`] - stateless JSON to domain conversion

use crate::VacancyRecord;
use async_trait::async_trait;
use serde_json::Value;

pub mod api_config;
pub mod detail;
pub mod http;
pub mod listing;
pub mod parser;

pub use api_config::ApiConfig;
pub use detail::DetailFetcher;
pub use http::HttpTransport;
pub use listing::ListingFetcher;
pub use parser::VacancyParser;

/// Fetcher errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetcherError {
    /// Connection, DNS, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Body was not JSON or a required field is missing
    #[error("parse error: {0}")]
    Parse(String),

    /// The fetch panicked before producing a result
    #[error("fetch panicked: {0}")]
    Panicked(String),
}

impl FetcherError {
    /// Whether repeating the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetcherError::Transport(_) => true,
            FetcherError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            FetcherError::Parse(_) | FetcherError::Panicked(_) => false,
        }
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Capability to GET a URL with query parameters and decode the JSON body
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Issue one GET request
    ///
    /// # Errors
    /// [`FetcherError::Transport`] when no response arrives,
    /// [`FetcherError::HttpStatus`] on a non-2xx status and
    /// [`FetcherError::Parse`] when the body is not JSON.
    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> FetcherResult<Value>;
}

/// Retrieves one vacancy by its detail URL
#[async_trait]
pub trait VacancyFetcher: Send + Sync {
    /// Fetch and parse a single vacancy
    async fn fetch_detail(&self, url: &str) -> FetcherResult<VacancyRecord>;
}
