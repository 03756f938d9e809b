use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app::ScrapeResult;
use crate::domain::url::{SourceSite, DEFAULT_BASE_URL};

/// Configuration for fetching and scraping the source site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Root of the trusted site; every fetched URL must live under it
    pub base_url: String,

    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,

    /// Extra attempts after a network failure (default: 2)
    pub max_retries: u32,

    /// First retry delay in milliseconds, doubled on each attempt (default: 500)
    pub backoff_base_ms: u64,

    /// User agent string to use
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            max_retries: 2,
            backoff_base_ms: 500,
            user_agent: "Mozilla/5.0 (Linux; Android 10; Mobile) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36"
                .to_string(),
        }
    }
}

impl ScraperConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    pub fn site(&self) -> ScrapeResult<SourceSite> {
        SourceSite::new(&self.base_url)
    }
}
