//! Detail fetcher: one request, one [`VacancyRecord`]

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::fetcher::parser::VacancyParser;
use crate::fetcher::{FetcherResult, JsonTransport, VacancyFetcher};
use crate::VacancyRecord;

/// Fetches a vacancy's detail endpoint and parses it
#[derive(Clone)]
pub struct DetailFetcher {
    transport: Arc<dyn JsonTransport>,
}

impl DetailFetcher {
    /// Create a detail fetcher over `transport`
    pub fn new(transport: Arc<dyn JsonTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl VacancyFetcher for DetailFetcher {
    async fn fetch_detail(&self, url: &str) -> FetcherResult<VacancyRecord> {
        let body = self.transport.get_json(url, &[]).await?;
        let record = VacancyParser::parse_vacancy(&body)?;
        debug!("Parsed vacancy '{}' from {}", record.title, url);
        Ok(record)
    }
}
