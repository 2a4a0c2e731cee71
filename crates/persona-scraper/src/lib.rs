//! Persona Scraper - Social profile evidence collection.
//!
//! This crate fetches public profile data for a person from a third-party
//! aggregation API, normalizes each platform's payload, cleans the text and
//! assembles one evidence string for a downstream analysis call.
//!
//! # Features
//!
//! - Username sanitization for handles, `@handles` and pasted profile URLs
//! - Retry logic with exponential backoff for 429/5xx and network failures
//! - Declarative per-platform field tables tolerant of schema drift
//! - Concurrent scraping with per-platform failure containment
//! - Deterministic evidence ordering
//!
//! # Example
//!
//! ```rust,ignore
//! use persona_core::{AppConfig, Platform};
//! use persona_scraper::ScrapeOrchestrator;
//! use std::collections::BTreeMap;
//!
//! let config = AppConfig::load_with_env()?;
//! let orchestrator = ScrapeOrchestrator::from_config(&config.scraping)?;
//!
//! let inputs = BTreeMap::from([
//!     (Platform::Instagram, "https://instagram.com/jane_doe".to_string()),
//!     (Platform::Tiktok, "@jane.doe".to_string()),
//! ]);
//!
//! let report = orchestrator.scrape_all(&inputs).await;
//! if report.is_empty() {
//!     // ask the user for screenshots or notes instead
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cleaner;
pub mod client;
#[allow(missing_docs)]
pub mod error;
pub mod evidence;
#[allow(missing_docs)]
pub mod normalizer;
pub mod orchestrator;
pub mod result;
#[allow(missing_docs)]
pub mod sanitize;

// Re-export commonly used types
pub use cleaner::clean_text;
pub use client::{
    fetch_with_retry, HttpTransport, ProfileRequest, ReqwestTransport, RetryPolicy,
    TransportResponse,
};
pub use error::{Result, ScrapeError};
pub use evidence::{build_evidence, EvidenceBundle, ScrapeReport};
pub use normalizer::{extract_fragments, extract_text, normalize_profile, SocialProfile};
pub use orchestrator::ScrapeOrchestrator;
pub use result::PlatformResult;
pub use sanitize::sanitize_username;
