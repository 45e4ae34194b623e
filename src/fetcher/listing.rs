//! Listing walker for the paginated search endpoint
//!
//! Requests pages `0..max_pages` in order and stops early once the server
//! reports the current page as the last one. Any page failure fails the whole
//! listing: a partial URL list is not usable.

use std::sync::Arc;
use tracing::{debug, info};

use crate::fetcher::api_config::ApiConfig;
use crate::fetcher::parser::VacancyParser;
use crate::fetcher::{FetcherResult, JsonTransport};
use crate::SearchQuery;

/// Collects vacancy detail URLs from the search endpoint
#[derive(Clone)]
pub struct ListingFetcher {
    transport: Arc<dyn JsonTransport>,
    listing_url: String,
}

impl ListingFetcher {
    /// Create a listing fetcher using `config`'s search endpoint
    pub fn new(transport: Arc<dyn JsonTransport>, config: &ApiConfig) -> Self {
        Self {
            transport,
            listing_url: config.listing_url(),
        }
    }

    /// Walk the search results and return every item URL in discovery order
    ///
    /// # Errors
    /// Returns the first page's [`FetcherError`](crate::fetcher::FetcherError)
    /// unchanged; no retry is attempted.
    pub async fn list_urls(&self, query: &SearchQuery) -> FetcherResult<Vec<String>> {
        let mut urls = Vec::new();

        for page_index in 0..query.max_pages {
            let params = query.page_params(page_index);
            debug!("Fetching listing page {} for '{}'", page_index, query.search_text);

            let body = self.transport.get_json(&self.listing_url, &params).await?;
            let page = VacancyParser::parse_listing(&body, page_index)?;

            debug!(
                "Listing page {}/{}: {} urls",
                page.page_index + 1,
                page.total_pages,
                page.items.len()
            );

            let is_last = page.is_last();
            urls.extend(page.items);

            if is_last {
                info!(
                    "Reached last listing page {} of {}",
                    page_index + 1,
                    page.total_pages
                );
                break;
            }
        }

        info!("Listing complete: {} vacancy urls", urls.len());
        Ok(urls)
    }
}
