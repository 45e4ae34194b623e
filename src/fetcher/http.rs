//! reqwest-backed JSON transport
//!
//! One attempt per call: retries belong to the batch policy, not the transport.
//! Failures are classified into transport, HTTP status and parse errors.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::fetcher::api_config::ApiConfig;
use crate::fetcher::{FetcherError, FetcherResult, JsonTransport};
use crate::metrics::HttpRequestMetrics;

/// HTTP client for the vacancy API
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    listing_url: String,
}

impl HttpTransport {
    /// Build a client from `config`
    ///
    /// # Errors
    /// Returns [`FetcherError::Transport`] if the proxy URL is invalid or the
    /// TLS backend cannot be initialised.
    pub fn new(config: &ApiConfig) -> FetcherResult<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| FetcherError::Transport(format!("invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| FetcherError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            listing_url: config.listing_url(),
        }
    }

    fn endpoint_label(&self, url: &str) -> &'static str {
        if url == self.listing_url {
            "listing"
        } else {
            "detail"
        }
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> FetcherResult<Value> {
        let metrics = HttpRequestMetrics::start(self.endpoint_label(url));
        debug!("GET {} with {} params", url, params.len());

        let response = match self.client.get(url).query(params).send().await {
            Ok(resp) => resp,
            Err(e) => {
                metrics.record_network_error();
                let kind = if e.is_timeout() { "timeout" } else { "request failed" };
                return Err(FetcherError::Transport(format!("{kind}: {e}")));
            }
        };

        let status = response.status();
        metrics.record_complete(status.as_u16());

        if !status.is_success() {
            warn!(
                correlation_id = metrics.correlation_id(),
                "GET {} returned {}",
                url,
                status
            );
            return Err(FetcherError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetcherError::Parse(format!("invalid JSON body from {url}: {e}")))
    }
}
