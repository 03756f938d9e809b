pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::ScrapeResult;
use crate::domain::CanonicalUrl;

pub use http_fetcher::HttpFetcher;

/// Retrieves raw HTML for a page on the source site.
///
/// Implementations do not retry; that policy lives in the scraper.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &CanonicalUrl) -> ScrapeResult<String>;
}
