//! Per-platform scrape outcome.

use persona_core::{Platform, ScrapeStatus};
use serde::{Deserialize, Serialize};

/// Reason attached to `no_content` results.
pub const NO_CONTENT_REASON: &str = "No public bio text found";

/// Outcome of one scrape attempt for one platform.
///
/// Results are built through [`PlatformResult::skipped`] or
/// [`PlatformResult::loading`] followed by one of the consuming terminal
/// transitions, so status, text and error always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResult {
    /// Platform that was scraped
    pub platform: Platform,
    /// Sanitized handle used for the request (raw input when skipped)
    pub username: String,
    /// Terminal status, or `loading` while in flight
    pub status: ScrapeStatus,
    /// Cleaned profile text; empty unless `status == success`
    pub text: String,
    /// Character count of `text`
    pub chars: usize,
    /// Failure reason for `error`, informational reason for `no_content`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw HTTP status of the last response, when one was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl PlatformResult {
    /// Result for a platform the caller left blank. Never passes through `loading`.
    #[must_use]
    pub fn skipped(platform: Platform, raw_username: impl Into<String>) -> Self {
        Self {
            platform,
            username: raw_username.into(),
            status: ScrapeStatus::Skipped,
            text: String::new(),
            chars: 0,
            error: None,
            http_status: None,
        }
    }

    /// In-flight result, created when the request is dispatched.
    #[must_use]
    pub fn loading(platform: Platform, username: impl Into<String>) -> Self {
        Self {
            platform,
            username: username.into(),
            status: ScrapeStatus::Loading,
            text: String::new(),
            chars: 0,
            error: None,
            http_status: None,
        }
    }

    /// Settle with extracted text.
    ///
    /// Text that is empty after trimming settles as `no_content` instead.
    #[must_use]
    pub fn succeed(self, text: impl Into<String>, http_status: Option<u16>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            return self.no_content(http_status);
        }

        Self {
            status: ScrapeStatus::Success,
            chars: text.chars().count(),
            text,
            error: None,
            http_status,
            ..self
        }
    }

    /// Settle as failed.
    #[must_use]
    pub fn fail(self, reason: impl Into<String>, http_status: Option<u16>) -> Self {
        let reason = reason.into();
        Self {
            status: ScrapeStatus::Error,
            text: String::new(),
            chars: 0,
            error: Some(if reason.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                reason
            }),
            http_status,
            ..self
        }
    }

    /// Settle as a successful request without extractable text.
    #[must_use]
    pub fn no_content(self, http_status: Option<u16>) -> Self {
        Self {
            status: ScrapeStatus::NoContent,
            text: String::new(),
            chars: 0,
            error: Some(NO_CONTENT_REASON.to_string()),
            http_status,
            ..self
        }
    }

    /// Whether this result contributes evidence.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.status == ScrapeStatus::Success && self.chars > 0
    }
}
