//! hh.ru API configuration
//!
//! Endpoint paths and client settings live here so that tests can point the
//! fetchers at a different base URL without touching the fetch logic.

use std::time::Duration;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.hh.ru";

/// Search endpoint path
pub const VACANCIES_ENDPOINT: &str = "/vacancies";

/// hh.ru rejects requests without a User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("vacancy-scraper/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client and endpoint settings for the vacancy API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root without a trailing slash
    pub base_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Total request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Optional proxy applied to all schemes
    pub proxy: Option<String>,
}

impl ApiConfig {
    /// Configuration rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route requests through a proxy
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Full URL of the search endpoint
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, VACANCIES_ENDPOINT)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
        }
    }
}
