//! Shared types used across the Persona workspace.
//!
//! This module defines the platform identifiers and the scrape status enum
//! that both the scraper crate and the command-line shell speak.

use crate::error::PersonaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Social-media platforms a profile handle can belong to.
///
/// Knowing a platform does not mean it can be scraped: only platforms with an
/// entry in the configured endpoint table are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// instagram.com
    Instagram,
    /// x.com / twitter.com
    Twitter,
    /// tiktok.com
    Tiktok,
    /// snapchat.com
    Snapchat,
    /// youtube.com
    Youtube,
    /// facebook.com
    Facebook,
    /// threads.net
    Threads,
}

impl Platform {
    /// Every known platform, in declaration order.
    pub const ALL: [Platform; 7] = [
        Platform::Instagram,
        Platform::Twitter,
        Platform::Tiktok,
        Platform::Snapchat,
        Platform::Youtube,
        Platform::Facebook,
        Platform::Threads,
    ];

    /// Lowercase identifier used in config files, URLs and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Tiktok => "tiktok",
            Platform::Snapchat => "snapchat",
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
            Platform::Threads => "threads",
        }
    }

    /// Human-readable name for evidence headers and status output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Twitter => "X / Twitter",
            Platform::Tiktok => "TikTok",
            Platform::Snapchat => "Snapchat",
            Platform::Youtube => "YouTube",
            Platform::Facebook => "Facebook",
            Platform::Threads => "Threads",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "x" {
            return Ok(Platform::Twitter);
        }

        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == normalized)
            .ok_or_else(|| PersonaError::Validation(format!("unknown platform '{}'", s.trim())))
    }
}

/// Outcome of a single platform scrape.
///
/// `Loading` is the only non-terminal state. A scrape is dispatched as
/// `Loading` and settles exactly once into `Success`, `Error` or `NoContent`;
/// `Skipped` is reached directly without ever loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    /// Request dispatched, not yet settled
    Loading,
    /// Request succeeded and produced text
    Success,
    /// Request failed or the platform is unsupported
    Error,
    /// Caller supplied no username
    Skipped,
    /// Request succeeded but no extractable text existed
    NoContent,
}

impl ScrapeStatus {
    /// Whether this status is final.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ScrapeStatus::Loading)
    }

    /// Snake-case identifier, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeStatus::Loading => "loading",
            ScrapeStatus::Success => "success",
            ScrapeStatus::Error => "error",
            ScrapeStatus::Skipped => "skipped",
            ScrapeStatus::NoContent => "no_content",
        }
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
