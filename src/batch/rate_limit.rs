//! Fixed-interval rate gate
//!
//! A semaphore whose permits are held for a full window after each acquire.
//! With one permit this is a global gate: request starts are spaced at least
//! `window` apart across every caller, regardless of how long each request
//! takes.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Instant};

use crate::metrics;

/// Something callers wait on before starting a request
#[async_trait]
pub trait RequestGate: Send + Sync {
    /// Wait for this caller's turn
    async fn acquire(&self) -> Result<(), RateLimitError>;
}

/// Request-based rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a request-based rate limiter
    ///
    /// # Arguments
    /// * `max_requests` - Maximum requests started per window
    /// * `window` - Time each permit stays taken after acquire
    pub fn request_based(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_requests)),
            max_requests,
            window,
        }
    }

    /// One request start per `delay`, globally
    pub fn fixed_interval(delay: Duration) -> Self {
        Self::request_based(1, delay)
    }

    /// Window each permit is held for
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Maximum requests per window
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Wait for a permit, then hand it to a timer that releases it after the
    /// window elapses.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        let started = Instant::now();

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| RateLimitError::AcquireError(e.to_string()))?;

        metrics::record_gate_wait(started.elapsed());

        if self.window.is_zero() {
            return Ok(());
        }

        let window = self.window;
        tokio::spawn(async move {
            sleep(window).await;
            drop(permit);
        });

        Ok(())
    }
}

#[async_trait]
impl RequestGate for RateLimiter {
    async fn acquire(&self) -> Result<(), RateLimitError> {
        RateLimiter::acquire(self).await
    }
}

/// Gate that never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

#[async_trait]
impl RequestGate for Unthrottled {
    async fn acquire(&self) -> Result<(), RateLimitError> {
        Ok(())
    }
}

/// Rate limiter errors
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Failed to acquire permits
    #[error("failed to acquire rate limit permits: {0}")]
    AcquireError(String),
}
