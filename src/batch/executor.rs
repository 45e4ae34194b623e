//! Concurrent detail fetch executor
//!
//! Spawns one task per URL into a [`JoinSet`]. Every task waits at the shared
//! [`RequestGate`] before each request and reports back over a channel, so
//! results are consumed in completion order. What happens on the first
//! failure is decided by [`OnError`]; whenever the batch stops early the
//! remaining tasks are aborted rather than left running.

use futures::FutureExt;
use indicatif::ProgressBar;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::batch::config::{calculate_backoff, OnError};
use crate::batch::rate_limit::{RateLimitError, RequestGate};
use crate::batch::task::{FetchTask, TaskState};
use crate::batch::BatchError;
use crate::fetcher::{FetcherError, FetcherResult, VacancyFetcher};
use crate::metrics;
use crate::VacancyRecord;

/// Messages from fetch tasks to the executor
enum TaskEvent {
    Started(usize),
    Retrying {
        index: usize,
        attempt: u32,
        error: FetcherError,
    },
    Finished(usize, FetcherResult<VacancyRecord>),
    GateClosed(usize, RateLimitError),
}

/// The failure that stopped a batch
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// URL whose fetch failed
    pub url: String,
    /// Final error for that URL
    pub error: FetcherError,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Records in completion order
    pub records: Vec<VacancyRecord>,
    /// One entry per input URL, in input order
    pub tasks: Vec<FetchTask>,
    /// Set when a fetch failure stopped the batch
    pub failure: Option<BatchFailure>,
    /// Set when the batch was cancelled from outside
    pub cancelled: bool,
}

impl BatchReport {
    /// Whether every URL produced a record
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && !self.cancelled && self.records.len() == self.tasks.len()
    }

    /// Number of tasks in `state`
    pub fn count(&self, state: TaskState) -> usize {
        self.tasks.iter().filter(|t| t.state == state).count()
    }
}

/// Runs a batch of detail fetches behind a shared rate gate
pub struct BatchExecutor {
    fetcher: Arc<dyn VacancyFetcher>,
    gate: Arc<dyn RequestGate>,
    policy: OnError,
    cancel: CancellationToken,
    progress: ProgressBar,
}

impl BatchExecutor {
    /// Create an executor with the default policy
    pub fn new(fetcher: Arc<dyn VacancyFetcher>, gate: Arc<dyn RequestGate>) -> Self {
        Self {
            fetcher,
            gate,
            policy: OnError::default(),
            cancel: CancellationToken::new(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Set the failure policy
    pub fn with_policy(mut self, policy: OnError) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a token that stops the batch when cancelled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Token that stops this executor; shared with the listing stage
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch every URL and collect the records
    ///
    /// # Errors
    /// [`BatchError::Aborted`] on the first failure under
    /// [`OnError::AbortBatch`]; [`BatchError::RateLimit`] if the gate fails.
    /// Under the other policies a failure is reported in
    /// [`BatchReport::failure`] alongside the records completed before it.
    pub async fn run_batch(&self, urls: Vec<String>) -> Result<BatchReport, BatchError> {
        let mut report = BatchReport {
            tasks: urls.iter().map(FetchTask::new).collect(),
            ..BatchReport::default()
        };

        if urls.is_empty() {
            return Ok(report);
        }

        let total = urls.len();
        info!("Starting batch of {} vacancies (on error: {})", total, self.policy);
        self.progress.set_length(total as u64);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut join_set = JoinSet::new();

        for (index, url) in urls.into_iter().enumerate() {
            join_set.spawn(fetch_task(
                index,
                url,
                self.fetcher.clone(),
                self.gate.clone(),
                self.policy.max_retries(),
                tx.clone(),
            ));
        }
        drop(tx);

        let mut gate_error = None;

        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Batch cancelled with {}/{} vacancies fetched", report.records.len(), total);
                    report.cancelled = true;
                    break;
                }
                event = rx.recv() => event,
            };

            // Every task has finished and dropped its sender
            let Some(event) = event else { break };

            match event {
                TaskEvent::Started(index) => report.tasks[index].mark_in_flight(),
                TaskEvent::Retrying {
                    index,
                    attempt,
                    error,
                } => {
                    warn!(
                        "Retry {} for {} after error: {}",
                        attempt, report.tasks[index].source_url, error
                    );
                    report.tasks[index].mark_retrying(&error);
                }
                TaskEvent::Finished(index, Ok(record)) => {
                    metrics::record_vacancy_outcome(true);
                    report.tasks[index].mark_completed();
                    report.records.push(record);
                    self.progress.inc(1);
                    debug!("Fetched {}/{}", report.records.len(), total);
                }
                TaskEvent::Finished(index, Err(err)) => {
                    metrics::record_vacancy_outcome(false);
                    let task = &mut report.tasks[index];
                    task.mark_failed(&err);
                    error!(
                        "Fetch of {} failed after {} attempt(s): {}",
                        task.source_url, task.attempts, err
                    );
                    report.failure = Some(BatchFailure {
                        url: task.source_url.clone(),
                        error: err,
                    });
                    break;
                }
                TaskEvent::GateClosed(index, err) => {
                    error!("Rate gate failed for {}: {}", report.tasks[index].source_url, err);
                    gate_error = Some(err);
                    break;
                }
            }
        }

        let outstanding = join_set.len();
        join_set.shutdown().await;
        if outstanding > 0 {
            debug!("Cancelled {} outstanding fetch tasks", outstanding);
        }

        for task in &mut report.tasks {
            task.mark_abandoned();
        }
        self.progress.finish();

        if let Some(err) = gate_error {
            return Err(BatchError::RateLimit(err));
        }

        info!(
            "Batch finished: {} fetched, {} failed, {} abandoned",
            report.count(TaskState::Completed),
            report.count(TaskState::Failed),
            report.count(TaskState::Abandoned)
        );

        match (self.policy, report.failure.take()) {
            (OnError::AbortBatch, Some(failure)) => Err(BatchError::Aborted {
                url: failure.url,
                source: failure.error,
            }),
            (_, failure) => {
                report.failure = failure;
                Ok(report)
            }
        }
    }
}

/// Body of one spawned fetch: gate, request, and retries when allowed
async fn fetch_task(
    index: usize,
    url: String,
    fetcher: Arc<dyn VacancyFetcher>,
    gate: Arc<dyn RequestGate>,
    max_retries: u32,
    events: mpsc::UnboundedSender<TaskEvent>,
) {
    let mut retries = 0;

    loop {
        if let Err(err) = gate.acquire().await {
            let _ = events.send(TaskEvent::GateClosed(index, err));
            return;
        }
        let _ = events.send(TaskEvent::Started(index));

        // A panic fails this URL like any other fetch error
        let result = match AssertUnwindSafe(fetcher.fetch_detail(&url))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(FetcherError::Panicked(panic_message(payload.as_ref()))),
        };

        match result {
            Err(error) if retries < max_retries && error.is_retryable() => {
                let backoff = calculate_backoff(retries);
                retries += 1;
                metrics::record_retry_backoff(backoff, retries);
                let _ = events.send(TaskEvent::Retrying {
                    index,
                    attempt: retries,
                    error,
                });
                tokio::time::sleep(backoff).await;
            }
            result => {
                let _ = events.send(TaskEvent::Finished(index, result));
                return;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
