use async_trait::async_trait;
use reqwest::Client;

use crate::app::{ScrapeError, ScrapeResult};
use crate::domain::{CanonicalUrl, SourceSite};
use crate::fetcher::Fetcher;
use crate::scraper::ScraperConfig;

pub struct HttpFetcher {
    client: Client,
    site: SourceSite,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> ScrapeResult<Self> {
        let site = config.site()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ScrapeError::network(site.home().as_str(), e.to_string()))?;

        Ok(Self { client, site })
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &CanonicalUrl) -> ScrapeResult<String> {
        // Callers may build CanonicalUrls for another site; re-check before sending.
        let url = self.site.canonicalize(url.as_str())?;

        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ScrapeError::network(url.as_str(), describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::network(
                url.as_str(),
                format!("unexpected status {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::network(url.as_str(), describe(&e)))
    }
}
