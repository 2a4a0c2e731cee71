//! Persona Core - Foundation crate for the Persona profile-evidence pipeline.
//!
//! This crate provides shared types, error handling and configuration
//! management that the scraper crate and the command-line shell depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared enums (`Platform`, `ScrapeStatus`)
//!
//! # Example
//!
//! ```rust
//! use persona_core::{AppConfig, Platform};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.scraping.endpoint(Platform::Instagram).is_some());
//! assert!(config.scraping.endpoint(Platform::Facebook).is_none());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    ApiKeyPlacement, AppConfig, EndpointConfig, LoggingConfig, ScrapingConfig,
    DEFAULT_EVIDENCE_ORDER,
};
pub use error::{ConfigError, ConfigResult, PersonaError};
pub use types::{Platform, ScrapeStatus};
