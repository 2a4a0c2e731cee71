//! Configuration management for Persona.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The scraping API key has no built-in
//! default: it must come from the config file or `PERSONA_SCRAPE_API_KEY`.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Platform;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Order in which per-platform evidence blocks are concatenated.
///
/// Matches the order the analysis prompt lists handles in; platforms not
/// listed here are appended afterwards in declaration order.
pub const DEFAULT_EVIDENCE_ORDER: [Platform; 7] = [
    Platform::Instagram,
    Platform::Tiktok,
    Platform::Twitter,
    Platform::Snapchat,
    Platform::Youtube,
    Platform::Facebook,
    Platform::Threads,
];

/// Main application configuration.
///
/// This is loaded from `~/.config/persona/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Profile scraping settings
    pub scraping: ScrapingConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `PERSONA_SCRAPE_API_KEY`: Scraping API key
    /// - `PERSONA_SCRAPE_BASE_URL`: Scraping API base URL
    /// - `PERSONA_REQUEST_TIMEOUT_SECS`: Per-attempt request timeout
    /// - `PERSONA_LOG`: Log filter directive
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    ///
    /// Values that fail to parse are ignored and the file value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("PERSONA_SCRAPE_API_KEY") {
            if !key.trim().is_empty() {
                self.scraping.api_key = Some(key.trim().to_string());
                tracing::debug!("Override scraping.api_key from env");
            }
        }

        if let Some(url) = lookup("PERSONA_SCRAPE_BASE_URL") {
            if !url.trim().is_empty() {
                tracing::debug!("Override scraping.base_url from env: {}", url.trim());
                self.scraping.base_url = url.trim().to_string();
            }
        }

        if let Some(val) = lookup("PERSONA_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.trim().parse() {
                self.scraping.request_timeout_secs = secs;
                tracing::debug!("Override scraping.request_timeout_secs from env: {}", secs);
            }
        }

        if let Some(filter) = lookup("PERSONA_LOG") {
            if !filter.trim().is_empty() {
                self.logging.filter = filter.trim().to_string();
            }
        }
    }

    /// Check values that would make the pipeline misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        self.scraping.validate()
    }

    /// Save configuration to the default config path.
    ///
    /// The API key is never written back.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/persona/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "persona", "persona").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Where the scraping API key is attached to outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyPlacement {
    /// `x-api-key` request header
    #[default]
    Header,
    /// `api_key` query parameter
    Query,
    /// Both header and query parameter
    Both,
}

impl ApiKeyPlacement {
    /// Whether the key goes into the `x-api-key` header.
    #[must_use]
    pub fn uses_header(self) -> bool {
        matches!(self, ApiKeyPlacement::Header | ApiKeyPlacement::Both)
    }

    /// Whether the key goes into the query string.
    #[must_use]
    pub fn uses_query(self) -> bool {
        matches!(self, ApiKeyPlacement::Query | ApiKeyPlacement::Both)
    }
}

/// One row of the supported-endpoints table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Platform served by this endpoint
    pub platform: Platform,
    /// Path below the base URL, e.g. `v1/instagram/profile`
    pub path: String,
    /// Query parameter that carries the username
    pub id_param: String,
}

impl EndpointConfig {
    fn new(platform: Platform, path: &str) -> Self {
        Self {
            platform,
            path: path.to_string(),
            id_param: "username".to_string(),
        }
    }
}

/// Profile scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Base URL of the profile aggregation API
    pub base_url: String,
    /// API key (file or `PERSONA_SCRAPE_API_KEY`; never saved)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// How the API key is attached to requests
    pub api_key_placement: ApiKeyPlacement,
    /// Per-attempt request timeout in seconds
    pub request_timeout_secs: u64,
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles on each retry
    pub backoff_base_ms: u64,
    /// Evidence concatenation order
    pub evidence_order: Vec<Platform>,
    /// Supported endpoints; platforms without a row are unsupported
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.scrapecreators.com".to_string(),
            api_key: None,
            api_key_placement: ApiKeyPlacement::Header,
            request_timeout_secs: 15,
            max_attempts: 3,
            backoff_base_ms: 1000,
            evidence_order: DEFAULT_EVIDENCE_ORDER.to_vec(),
            endpoints: vec![
                EndpointConfig::new(Platform::Instagram, "v1/instagram/profile"),
                EndpointConfig::new(Platform::Twitter, "v1/twitter/user"),
                EndpointConfig::new(Platform::Tiktok, "v1/tiktok/profile"),
                EndpointConfig::new(Platform::Snapchat, "v1/snapchat/profile"),
            ],
        }
    }
}

impl ScrapingConfig {
    /// Look up the endpoint row for a platform.
    #[must_use]
    pub fn endpoint(&self, platform: Platform) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.platform == platform)
    }

    /// The configured API key, if one is set and not blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Check scraping values.
    pub fn validate(&self) -> ConfigResult<()> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "scraping.base_url".to_string(),
                reason: format!("must be an http(s) URL, got '{base}'"),
            });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.request_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        for endpoint in &self.endpoints {
            if endpoint.path.trim().is_empty() || endpoint.id_param.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("scraping.endpoints.{}", endpoint.platform),
                    reason: "path and id_param cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,persona=debug".to_string(),
        }
    }
}
