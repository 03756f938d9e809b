//! Scrape orchestration: validate → fetch (with retry) → parse.
//!
//! # Architecture
//!
//! ```text
//! URL → SourceSite::canonicalize → Fetcher → parser → record
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use chireader::scraper::{SiteScraper, ScraperConfig};
//!
//! let scraper = SiteScraper::from_config(&ScraperConfig::default())?;
//! let latest = scraper.latest_updates().await?;
//! let detail = scraper.novel_detail(latest[0].id.as_str()).await?;
//! ```

mod config;

pub use config::ScraperConfig;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::{ScrapeError, ScrapeResult};
use crate::domain::{CanonicalUrl, Chapter, HomePage, NovelDetail, NovelSummary, SourceSite};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::parser;

/// Answers the three site queries. Holds no state beyond its collaborators,
/// so every operation is idempotent.
pub struct SiteScraper {
    fetcher: Arc<dyn Fetcher>,
    site: SourceSite,
    config: ScraperConfig,
}

impl SiteScraper {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: ScraperConfig) -> ScrapeResult<Self> {
        let site = config.site()?;
        Ok(Self {
            fetcher,
            site,
            config,
        })
    }

    /// Build a scraper backed by the reqwest fetcher.
    pub fn from_config(config: &ScraperConfig) -> ScrapeResult<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config)?);
        Self::new(fetcher, config.clone())
    }

    pub fn site(&self) -> &SourceSite {
        &self.site
    }

    pub async fn home(&self) -> ScrapeResult<HomePage> {
        let url = self.site.home();
        let html = self.fetch_with_retry(&url).await?;
        parser::parse_home(&html, &url, &self.site)
    }

    pub async fn latest_updates(&self) -> ScrapeResult<Vec<NovelSummary>> {
        let url = self.site.home();
        let html = self.fetch_with_retry(&url).await?;
        parser::parse_latest_updates(&html, &url, &self.site)
    }

    pub async fn novel_detail(&self, url: &str) -> ScrapeResult<NovelDetail> {
        let url = self.site.canonicalize(url)?;
        let html = self.fetch_with_retry(&url).await?;
        parser::parse_novel_detail(&html, &url, &self.site)
    }

    pub async fn chapter(&self, url: &str) -> ScrapeResult<Chapter> {
        let url = self.site.canonicalize(url)?;
        let html = self.fetch_with_retry(&url).await?;
        parser::parse_chapter(&html, &url, &self.site)
    }

    /// Fetch, retrying network failures with exponential backoff.
    async fn fetch_with_retry(&self, url: &CanonicalUrl) -> ScrapeResult<String> {
        let mut attempt = 0;
        loop {
            debug!("fetching {} (attempt {})", url, attempt + 1);
            match self.fetcher.fetch(url).await {
                Ok(html) => return Ok(html),
                Err(e) if e.kind.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        "fetch of {} failed ({}), retrying in {:?}",
                        url, e.cause, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
