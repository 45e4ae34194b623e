//! Listing followed by the detail batch

use std::collections::HashSet;
use tracing::{info, warn};

use crate::batch::{BatchError, BatchExecutor, BatchReport};
use crate::fetcher::{FetcherError, ListingFetcher};
use crate::SearchQuery;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The listing could not be completed; nothing was fetched
    #[error("listing failed: {0}")]
    Listing(#[source] FetcherError),

    /// The detail batch failed as a whole
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// URLs returned by the listing, duplicates included
    pub discovered: usize,
    /// Duplicate URLs dropped before the batch
    pub duplicates: usize,
    /// Outcome of the detail batch
    pub batch: BatchReport,
}

impl ScrapeReport {
    /// Records ready for export
    pub fn records(&self) -> &[crate::VacancyRecord] {
        &self.batch.records
    }
}

/// Discovers vacancy URLs and fetches each of them
pub struct Pipeline {
    listing: ListingFetcher,
    executor: BatchExecutor,
}

impl Pipeline {
    /// Combine a listing fetcher with a batch executor
    pub fn new(listing: ListingFetcher, executor: BatchExecutor) -> Self {
        Self { listing, executor }
    }

    /// Run the listing, drop duplicate URLs and fetch the rest
    ///
    /// The executor's cancellation token also covers the listing: cancelling
    /// while pages are still being walked drops the in-flight request and
    /// returns an empty report marked `cancelled`.
    ///
    /// # Errors
    /// [`PipelineError::Listing`] if any listing page fails,
    /// [`PipelineError::Batch`] if the executor's policy turns a fetch
    /// failure into an error.
    pub async fn run(&self, query: &SearchQuery) -> Result<ScrapeReport, PipelineError> {
        info!(
            "Searching '{}' in area {} ({} pages max)",
            query.search_text, query.area_code, query.max_pages
        );

        let cancel = self.executor.cancellation();
        let urls = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Cancelled during listing; no vacancies fetched");
                return Ok(ScrapeReport {
                    discovered: 0,
                    duplicates: 0,
                    batch: BatchReport {
                        cancelled: true,
                        ..BatchReport::default()
                    },
                });
            }
            result = self.listing.list_urls(query) => result.map_err(PipelineError::Listing)?,
        };
        let discovered = urls.len();

        let urls = dedup_preserving_order(urls);
        let duplicates = discovered - urls.len();
        if duplicates > 0 {
            warn!("Dropped {} duplicate vacancy urls", duplicates);
        }

        let batch = self.executor.run_batch(urls).await?;

        Ok(ScrapeReport {
            discovered,
            duplicates,
            batch,
        })
    }
}

/// Keep the first occurrence of every URL
fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
