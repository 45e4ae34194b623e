//! Concurrent detail fetching and rate limiting
//!
//! Once the listing has produced a URL list, the batch fetches every vacancy
//! concurrently:
//!
//! 1. **Task Creation**: one [`task::FetchTask`] per URL, all spawned at once
//! 2. **Pacing**: each request waits at a shared [`rate_limit::RequestGate`]
//! 3. **Collection**: records are gathered in completion order by
//!    [`executor::BatchExecutor`]
//! 4. **Failure Policy**: [`config::OnError`] decides whether the first failure
//!    stops with partial results, aborts, or is retried first
//!
//! # Components
//!
//! - [`executor`] - Batch executor and its report
//! - [`rate_limit`] - Fixed-interval gate
//! - [`task`] - Per-URL state tracking
//! - [`config`] - Defaults, backoff and the failure policy

pub mod config;
pub mod executor;
pub mod rate_limit;
pub mod task;

pub use config::{OnError, OnErrorKind};
pub use executor::{BatchExecutor, BatchFailure, BatchReport};
pub use rate_limit::{RateLimitError, RateLimiter, RequestGate, Unthrottled};
pub use task::{FetchTask, TaskState};

use crate::fetcher::FetcherError;

/// Batch errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// A fetch failed under [`OnError::AbortBatch`]
    #[error("batch aborted after failure of {url}: {source}")]
    Aborted {
        /// URL whose fetch failed
        url: String,
        /// Underlying fetch error
        #[source]
        source: FetcherError,
    },

    /// Rate limit error
    #[error("rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),
}
