//! Scrape orchestrator for collecting profile evidence across platforms.
//!
//! This module provides the `ScrapeOrchestrator` which runs
//! sanitize → fetch-with-retry → normalize → clean for every requested
//! platform concurrently and aggregates the settled results into a
//! [`ScrapeReport`].
//!
//! Failures never escape as `Err`: every platform settles into a
//! [`PlatformResult`], so one platform's failure cannot abort the others.

use crate::client::{
    fetch_with_retry, HttpTransport, ProfileRequest, ReqwestTransport, RetryPolicy,
    TransportResponse,
};
use crate::error::{Result, ScrapeError};
use crate::evidence::ScrapeReport;
use crate::normalizer::{extract_text, normalize_profile, SocialProfile};
use crate::result::PlatformResult;
use crate::sanitize::sanitize_username;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use persona_core::{EndpointConfig, Platform, ScrapingConfig};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Runs profile scrapes for a set of platforms.
pub struct ScrapeOrchestrator {
    /// Scraping settings, including the endpoint table
    config: ScrapingConfig,
    /// API key, resolved once at construction
    api_key: String,
    /// Network access
    transport: Arc<dyn HttpTransport>,
    /// Retry budget and timeouts
    policy: RetryPolicy,
    /// Receives `loading` and terminal snapshots as scrapes progress
    progress: Option<UnboundedSender<PlatformResult>>,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator over an explicit transport.
    ///
    /// # Errors
    /// Returns [`ScrapeError::MissingApiKey`] when `config` carries no API key.
    pub fn new(config: ScrapingConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or(ScrapeError::MissingApiKey)?
            .to_string();
        let policy = RetryPolicy::from_config(&config);

        Ok(Self {
            config,
            api_key,
            transport,
            policy,
            progress: None,
        })
    }

    /// Create an orchestrator that talks to the network through `reqwest`.
    pub fn from_config(config: &ScrapingConfig) -> Result<Self> {
        Self::new(config.clone(), Arc::new(ReqwestTransport::new()?))
    }

    /// Override the retry policy derived from the config.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report progress snapshots on `sender`.
    ///
    /// Each dispatched platform sends its `loading` result, then its terminal
    /// result. Skipped and unsupported platforms send only the terminal one.
    #[must_use]
    pub fn with_progress(mut self, sender: UnboundedSender<PlatformResult>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Scrape every platform in `inputs` concurrently.
    ///
    /// Waits for all platforms to settle; slow platforms are not cancelled.
    pub async fn scrape_all(&self, inputs: &BTreeMap<Platform, String>) -> ScrapeReport {
        let mut pending: FuturesUnordered<_> = inputs
            .iter()
            .map(|(&platform, raw)| async move {
                let outcome = AssertUnwindSafe(self.scrape_platform(platform, raw))
                    .catch_unwind()
                    .await;
                (platform, raw, outcome)
            })
            .collect();

        let mut results = BTreeMap::new();
        while let Some((platform, raw, outcome)) = pending.next().await {
            let result = outcome.unwrap_or_else(|_| {
                tracing::error!("Scrape for {} panicked", platform);
                let result = PlatformResult::loading(platform, sanitize_username(raw))
                    .fail("Internal error while scraping", None);
                self.notify(&result);
                result
            });
            results.insert(platform, result);
        }

        ScrapeReport::new(results, &self.config.evidence_order)
    }

    /// Scrape one platform. Never fails: errors are reported in the result.
    pub async fn scrape_platform(&self, platform: Platform, raw_username: &str) -> PlatformResult {
        let username = sanitize_username(raw_username);

        let result = if username.is_empty() {
            PlatformResult::skipped(platform, raw_username.trim())
        } else {
            let loading = PlatformResult::loading(platform, &username);
            match self.config.endpoint(platform) {
                None => loading.fail(
                    ScrapeError::UnsupportedPlatform { platform }.to_string(),
                    None,
                ),
                Some(endpoint) => {
                    self.notify(&loading);
                    self.scrape_endpoint(endpoint, loading).await
                }
            }
        };

        tracing::info!(
            platform = %result.platform,
            username = %result.username,
            status = %result.status,
            chars = result.chars,
            "Scrape settled"
        );
        self.notify(&result);
        result
    }

    /// Fetch and normalize the full profile record for one platform.
    ///
    /// Unlike [`ScrapeOrchestrator::scrape_platform`] this returns errors.
    pub async fn fetch_profile(
        &self,
        platform: Platform,
        raw_username: &str,
    ) -> Result<SocialProfile> {
        let username = sanitize_username(raw_username);
        if username.is_empty() {
            return Err(ScrapeError::EmptyUsername { platform });
        }

        let endpoint = self
            .config
            .endpoint(platform)
            .ok_or(ScrapeError::UnsupportedPlatform { platform })?;

        let response = self.fetch(endpoint, &username).await?;
        if !response.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: response.status,
            });
        }

        let payload: serde_json::Value = serde_json::from_str(&response.body)?;
        Ok(normalize_profile(&payload, platform, &username))
    }

    async fn fetch(&self, endpoint: &EndpointConfig, username: &str) -> Result<TransportResponse> {
        let request = ProfileRequest::build(&self.config, endpoint, username, &self.api_key)?;
        fetch_with_retry(self.transport.as_ref(), &request, &self.policy).await
    }

    async fn scrape_endpoint(
        &self,
        endpoint: &EndpointConfig,
        loading: PlatformResult,
    ) -> PlatformResult {
        let platform = loading.platform;

        let response = match self.fetch(endpoint, &loading.username).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Scrape for {} failed: {}", platform, e);
                return loading.fail(e.to_string(), None);
            }
        };

        let http_status = Some(response.status);
        match response.status {
            404 => loading.fail("404 Profile not found", http_status),
            401 | 403 => loading.fail(
                format!("API key invalid ({})", response.status),
                http_status,
            ),
            status if !response.is_success() => {
                tracing::warn!("Profile endpoint for {} failed ({})", platform, status);
                loading.fail(
                    ScrapeError::HttpStatus { status }.to_string(),
                    http_status,
                )
            }
            _ => match serde_json::from_str::<serde_json::Value>(&response.body) {
                Ok(payload) => loading.succeed(extract_text(&payload, platform), http_status),
                Err(e) => loading.fail(ScrapeError::InvalidResponse(e).to_string(), http_status),
            },
        }
    }

    fn notify(&self, result: &PlatformResult) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(result.clone());
        }
    }
}
