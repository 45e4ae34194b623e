//! Batch configuration constants and the failure policy

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default spacing between request starts
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// Default retry count for [`OnError::RetryThenFail`]
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound accepted for retry counts
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 30000; // 30 seconds

/// Calculate exponential backoff delay
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(retry_count));
    let delay_ms = delay_ms.min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}

/// What the batch does when a detail fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    /// Cancel the remaining fetches and return an error
    AbortBatch,
    /// Stop collecting and return what completed before the failure
    #[default]
    StopAndReturnPartial,
    /// Retry transient failures with backoff, then stop as
    /// [`OnError::StopAndReturnPartial`]
    RetryThenFail {
        /// Extra attempts per URL
        max_retries: u32,
    },
}

impl OnError {
    /// Retries allowed for one URL
    pub fn max_retries(&self) -> u32 {
        match self {
            OnError::RetryThenFail { max_retries } => *max_retries,
            _ => 0,
        }
    }
}

impl fmt::Display for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnError::AbortBatch => write!(f, "abort"),
            OnError::StopAndReturnPartial => write!(f, "stop"),
            OnError::RetryThenFail { max_retries } => write!(f, "retry({max_retries})"),
        }
    }
}

/// Policy name as given on the command line; retry count comes separately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnErrorKind {
    /// `abort`
    Abort,
    /// `stop`
    Stop,
    /// `retry`
    Retry,
}

impl OnErrorKind {
    /// Combine with a retry count into a full policy
    pub fn into_policy(self, max_retries: u32) -> OnError {
        match self {
            OnErrorKind::Abort => OnError::AbortBatch,
            OnErrorKind::Stop => OnError::StopAndReturnPartial,
            OnErrorKind::Retry => OnError::RetryThenFail { max_retries },
        }
    }
}

impl FromStr for OnErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(OnErrorKind::Abort),
            "stop" => Ok(OnErrorKind::Stop),
            "retry" => Ok(OnErrorKind::Retry),
            _ => Err(format!(
                "Invalid error policy: {s}. Valid options: stop, abort, retry"
            )),
        }
    }
}
