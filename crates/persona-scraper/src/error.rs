use persona_core::Platform;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("scraping API key is not configured")]
    MissingApiKey,

    #[error("Platform not supported by current API plan: {platform}")]
    UnsupportedPlatform { platform: Platform },

    #[error("no username given for {platform}")]
    EmptyUsername { platform: Platform },

    #[error("API error ({status})")]
    HttpStatus { status: u16 },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout / network error: no response after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid JSON response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Whether another attempt could succeed.
    ///
    /// Network failures and timeouts are transient; configuration and
    /// decoding problems are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Network(e) => !e.is_builder() && !e.is_decode(),
            ScrapeError::Timeout { .. } | ScrapeError::Transport(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ScrapeError::Timeout {
            after: Duration::from_secs(15)
        }
        .is_transient());
        assert!(ScrapeError::Transport("connection reset".to_string()).is_transient());
        assert!(!ScrapeError::MissingApiKey.is_transient());
        assert!(!ScrapeError::UnsupportedPlatform {
            platform: Platform::Facebook
        }
        .is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ScrapeError::Timeout {
            after: Duration::from_secs(15),
        };
        assert_eq!(
            err.to_string(),
            "Timeout / network error: no response after 15s"
        );

        let err = ScrapeError::UnsupportedPlatform {
            platform: Platform::Threads,
        };
        assert_eq!(
            err.to_string(),
            "Platform not supported by current API plan: threads"
        );
    }
}
