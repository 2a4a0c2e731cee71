//! HTTP access to the profile aggregation API.
//!
//! [`HttpTransport`] is the seam between the pipeline and the network;
//! [`fetch_with_retry`] layers the per-attempt timeout and the bounded
//! exponential backoff on top of any transport.

use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use persona_core::{EndpointConfig, ScrapingConfig};
use std::time::Duration;
use url::Url;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// A fully-formed profile lookup.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    /// Request URL, including the username and (optionally) the API key
    pub url: Url,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl ProfileRequest {
    /// Build `{base}/{path}?{id_param}={username}` for one endpoint row.
    ///
    /// The username is percent-encoded; the API key goes into the header
    /// and/or query string according to `config.api_key_placement`.
    pub fn build(
        config: &ScrapingConfig,
        endpoint: &EndpointConfig,
        username: &str,
        api_key: &str,
    ) -> Result<Self> {
        let base = Url::parse(&format!("{}/", config.base_url.trim().trim_end_matches('/')))?;
        let mut url = base.join(endpoint.path.trim().trim_start_matches('/'))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair(endpoint.id_param.trim(), username);
            if config.api_key_placement.uses_query() {
                query.append_pair(API_KEY_PARAM, api_key);
            }
        }

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if config.api_key_placement.uses_header() {
            headers.push((API_KEY_HEADER.to_string(), api_key.to_string()));
        }

        Ok(Self { url, headers })
    }

    /// URL with the API key masked, for logs.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        if !self.url.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
            return self.url.to_string();
        }

        let mut redacted = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == API_KEY_PARAM {
                    "***".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
        redacted.to_string()
    }
}

/// Status and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status is worth another attempt (429 or 5xx).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// Issues a single GET request. Implementations must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one request attempt.
    async fn get(&self, request: &ProfileRequest) -> Result<TransportResponse>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the crate user agent.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("persona-scraper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &ProfileRequest) -> Result<TransportResponse> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}

/// Attempt budget, backoff and per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles for each later one
    pub base_delay: Duration,
    /// Bound on each individual attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// Policy from the `[scraping]` config section.
    #[must_use]
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.backoff_base_ms),
            attempt_timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
        }
    }

    /// Delay after the failed attempt `attempt` (0-based): 1s, 2s, 4s, ...
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Fetch with bounded retries.
///
/// - 2xx and 404 return immediately.
/// - 429 and 5xx are retried; after the last attempt the last response is
///   returned for the caller to interpret.
/// - Other statuses (401, 403, ...) return immediately.
/// - Transient errors (network, timeout) are retried; after the last attempt
///   the error is returned. Other errors return immediately.
pub async fn fetch_with_retry(
    transport: &dyn HttpTransport,
    request: &ProfileRequest,
    policy: &RetryPolicy,
) -> Result<TransportResponse> {
    let attempts = policy.max_attempts.max(1);
    tracing::debug!("Requesting {}", request.redacted_url());

    for attempt in 0..attempts {
        let is_last = attempt + 1 == attempts;

        let outcome = tokio::time::timeout(policy.attempt_timeout, transport.get(request))
            .await
            .unwrap_or_else(|_| {
                Err(ScrapeError::Timeout {
                    after: policy.attempt_timeout,
                })
            });

        match outcome {
            Ok(response) if response.is_retryable() && !is_last => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "HTTP {} from {} (attempt {}/{}), retrying in {:?}",
                    response.status,
                    request.url.path(),
                    attempt + 1,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() && !is_last => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "Request to {} failed (attempt {}/{}): {}, retrying in {:?}",
                    request.url.path(),
                    attempt + 1,
                    attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(ScrapeError::Transport("max retries exceeded".to_string()))
}
