use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{CacheConfig, PageCache};
use crate::app::ScrapeResult;
use crate::domain::{Chapter, ChapterId, HomePage, NovelDetail, NovelId, NovelSummary, SourceSite};
use crate::scraper::SiteScraper;

/// Cache-backed access to the site.
///
/// All chapter and novel lookups go through the coalescing caches, so
/// concurrent readers and prefetches of the same page share one fetch.
#[derive(Clone)]
pub struct Library {
    scraper: Arc<SiteScraper>,
    chapters: Arc<PageCache<Chapter>>,
    novels: Arc<PageCache<NovelDetail>>,
}

impl Library {
    pub fn new(scraper: Arc<SiteScraper>, config: &CacheConfig) -> Self {
        Self {
            scraper,
            chapters: Arc::new(PageCache::new("chapter", config.chapter_capacity)),
            novels: Arc::new(PageCache::new("novel", config.novel_capacity)),
        }
    }

    pub fn site(&self) -> &SourceSite {
        self.scraper.site()
    }

    pub fn chapter_cache(&self) -> &PageCache<Chapter> {
        &self.chapters
    }

    pub fn novel_cache(&self) -> &PageCache<NovelDetail> {
        &self.novels
    }

    pub fn chapter_id(&self, url: &str) -> ScrapeResult<ChapterId> {
        self.site().canonicalize(url).map(ChapterId::new)
    }

    pub fn novel_id(&self, url: &str) -> ScrapeResult<NovelId> {
        self.site().canonicalize(url).map(NovelId::new)
    }

    pub async fn home(&self) -> ScrapeResult<HomePage> {
        self.scraper.home().await
    }

    pub async fn latest_updates(&self) -> ScrapeResult<Vec<NovelSummary>> {
        self.scraper.latest_updates().await
    }

    pub async fn chapter(&self, id: &ChapterId) -> ScrapeResult<Arc<Chapter>> {
        let scraper = self.scraper.clone();
        let url = id.as_str().to_string();
        self.chapters
            .get_or_fetch(id.url(), move || async move { scraper.chapter(&url).await })
            .await
    }

    pub async fn novel(&self, id: &NovelId) -> ScrapeResult<Arc<NovelDetail>> {
        let scraper = self.scraper.clone();
        let url = id.as_str().to_string();
        self.novels
            .get_or_fetch(id.url(), move || async move { scraper.novel_detail(&url).await })
            .await
    }

    /// Warm the chapter cache in the background.
    pub fn prefetch_chapter(&self, id: ChapterId) -> JoinHandle<()> {
        let library = self.clone();
        tokio::spawn(async move {
            if library.chapters.contains(id.url()) {
                debug!("prefetch skipped, {} already cached", id);
                return;
            }
            match library.chapter(&id).await {
                Ok(chapter) => info!("prefetched {} ({} paragraphs)", id, chapter.paragraphs.len()),
                Err(e) => debug!("prefetch of {} failed: {}", id, e),
            }
        })
    }
}
