//! Aggregation of per-platform results into prompt evidence.

use crate::result::PlatformResult;
use persona_core::{Platform, ScrapeStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settled results for one scrape invocation plus the assembled evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeReport {
    /// One result per requested platform
    pub results: BTreeMap<Platform, PlatformResult>,
    /// Evidence string built from the successful results
    pub evidence: String,
}

impl ScrapeReport {
    /// Build a report, assembling evidence in `order`.
    #[must_use]
    pub fn new(results: BTreeMap<Platform, PlatformResult>, order: &[Platform]) -> Self {
        let evidence = build_evidence(&results, order);
        Self { results, evidence }
    }

    /// Result for one platform, if it was requested.
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&PlatformResult> {
        self.results.get(&platform)
    }

    /// True when no platform produced any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.results.values().any(PlatformResult::has_text)
    }

    /// Total characters of scraped text across platforms.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.results.values().map(|r| r.chars).sum()
    }

    /// Number of results with the given status.
    #[must_use]
    pub fn count(&self, status: ScrapeStatus) -> usize {
        self.results.values().filter(|r| r.status == status).count()
    }
}

/// Resolve the concatenation order.
///
/// Duplicates in `order` are ignored; platforms it does not mention follow
/// in declaration order so the result always covers every platform once.
#[must_use]
pub fn resolve_order(order: &[Platform]) -> Vec<Platform> {
    let mut resolved: Vec<Platform> = Vec::with_capacity(Platform::ALL.len());
    for platform in order.iter().copied().chain(Platform::ALL) {
        if !resolved.contains(&platform) {
            resolved.push(platform);
        }
    }
    resolved
}

/// Concatenate successful results in a fixed order.
///
/// Each block is `[{label} @{username}]` followed by the cleaned text;
/// blocks are separated by a blank line. Launch and completion order have
/// no influence on the output.
#[must_use]
pub fn build_evidence(results: &BTreeMap<Platform, PlatformResult>, order: &[Platform]) -> String {
    resolve_order(order)
        .into_iter()
        .filter_map(|platform| results.get(&platform))
        .filter(|result| result.has_text())
        .map(|result| {
            format!(
                "[{} @{}]\n{}",
                result.platform.label(),
                result.username,
                result.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Everything the analysis call can be given about a person.
///
/// Only the scraped part comes from this crate; notes, uploaded text and
/// screenshots are supplied by the caller. The analysis call must not be
/// made when [`EvidenceBundle::has_evidence`] is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Evidence string from a [`ScrapeReport`]
    pub scraped: String,
    /// Free-form notes typed by the user
    pub manual_notes: String,
    /// Text extracted from uploaded chat exports
    pub uploaded_content: String,
    /// Number of attached screenshots
    pub image_count: usize,
}

impl EvidenceBundle {
    /// Bundle holding only scraped evidence.
    #[must_use]
    pub fn from_report(report: &ScrapeReport) -> Self {
        Self {
            scraped: report.evidence.clone(),
            ..Self::default()
        }
    }

    /// Attach manual notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.manual_notes = notes.into();
        self
    }

    /// Attach uploaded text content.
    #[must_use]
    pub fn with_uploaded(mut self, content: impl Into<String>) -> Self {
        self.uploaded_content = content.into();
        self
    }

    /// Record attached screenshots.
    #[must_use]
    pub fn with_images(mut self, count: usize) -> Self {
        self.image_count = count;
        self
    }

    /// Whether any source holds something to analyze.
    #[must_use]
    pub fn has_evidence(&self) -> bool {
        !self.scraped.trim().is_empty()
            || !self.manual_notes.trim().is_empty()
            || !self.uploaded_content.trim().is_empty()
            || self.image_count > 0
    }

    /// Text context for the analysis prompt; empty sections are left out.
    #[must_use]
    pub fn to_context(&self) -> String {
        [
            ("Social media profiles", self.scraped.trim()),
            ("Notes", self.manual_notes.trim()),
            ("Uploaded files", self.uploaded_content.trim()),
        ]
        .into_iter()
        .filter(|(_, body)| !body.is_empty())
        .map(|(title, body)| format!("{title}:\n{body}"))
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}
