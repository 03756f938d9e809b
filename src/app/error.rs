use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Classification of a scraping failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Timeout, DNS/connect failure or non-2xx status.
    Network,
    /// A required structural anchor was missing or empty.
    Parse,
    /// A navigation link was requested but the chapter has none.
    NotFound,
    /// The URL is relative, malformed or outside the source site.
    InvalidUrl,
}

impl ErrorKind {
    /// Only network failures are worth another attempt.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidUrl => "invalid url",
        };
        f.write_str(name)
    }
}

/// Error produced by the fetch/parse pipeline.
///
/// Cloneable so one failure can be handed to every caller waiting on the
/// same coalesced fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error at {source_url}: {cause}")]
pub struct ScrapeError {
    pub kind: ErrorKind,
    pub source_url: String,
    pub cause: String,
}

impl ScrapeError {
    pub fn new(kind: ErrorKind, source_url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            kind,
            source_url: source_url.into(),
            cause: cause.into(),
        }
    }

    pub fn network(source_url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, source_url, cause)
    }

    /// A required anchor was not found; `selector` is reported verbatim.
    pub fn missing(source_url: impl Into<String>, selector: &str) -> Self {
        Self::new(
            ErrorKind::Parse,
            source_url,
            format!("required element not found: `{}`", selector),
        )
    }

    pub fn not_found(source_url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, source_url, cause)
    }

    pub fn invalid_url(source_url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidUrl, source_url, cause)
    }
}

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_is_retryable() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(!ErrorKind::Parse.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::InvalidUrl.is_retryable());
    }

    #[test]
    fn test_missing_reports_selector() {
        let err = ScrapeError::missing("https://chireads.com/x/", "#content p");
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.cause.contains("#content p"));
        assert_eq!(
            err.to_string(),
            "parse error at https://chireads.com/x/: required element not found: `#content p`"
        );
    }
}
