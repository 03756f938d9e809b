//! End-to-end over a mock site: parser → scraper → cache → reader.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use chireader::app::{AppContext, ErrorKind, ScrapeError, ScrapeResult};
use chireader::config::Config;
use chireader::domain::CanonicalUrl;
use chireader::fetcher::Fetcher;
use chireader::reader::{Reader, ReaderState, Viewport};

const HOME: &str = "https://chireads.com/";
const NOVEL: &str = "https://chireads.com/category/translatedtales/novel-1/";
const CH1: &str = "https://chireads.com/category/translatedtales/novel-1/chapter-1/";
const CH2: &str = "https://chireads.com/category/translatedtales/novel-1/chapter-2/";

const HOME_HTML: &str = r##"
<html><body>
  <div class="dernieres-tabel">
    <table>
      <tr>
        <td><a href="https://chireads.com/category/translatedtales/novel-1/">Novel 1</a></td>
        <td><a href="https://chireads.com/category/translatedtales/novel-1/chapter-1/">Chapter 1</a></td>
        <td>Author</td>
        <td><a href="#">2023-10-27</a></td>
      </tr>
    </table>
  </div>
</body></html>"##;

const NOVEL_HTML: &str = r#"
<html><body>
  <div class="inform-title">Novel 1</div>
  <div class="inform-product"><img src="test.jpg" /></div>
  <div class="inform-inform-data"><h6>Author Name</h6></div>
  <div class="inform-txt-show"><span>Description of Novel 1.</span></div>
  <ul class="chapitre">
    <li><a href="https://chireads.com/category/translatedtales/novel-1/chapter-1/">Chapter 1</a></li>
    <li><a href="https://chireads.com/category/translatedtales/novel-1/chapter-2/">Chapter 2</a></li>
  </ul>
</body></html>"#;

fn chapter_html(n: usize, paragraphs: usize, next: Option<&str>) -> String {
    let body: String = (1..=paragraphs)
        .map(|i| format!("<p>Paragraph {i}: chapter {n}.</p>"))
        .collect();
    format!(
        r##"<html><body>
  <div class="article-title">Chapter {n}</div>
  <div id="content">{body}</div>
  <div class="article-function">
    <a href="#">Prev</a>
    <a href="#">Index</a>
    <a href="{}">Next</a>
  </div>
</body></html>"##,
        next.unwrap_or("#")
    )
}

/// In-memory site. Each page can be held back until a permit is released.
struct MockSite {
    pages: HashMap<String, String>,
    gates: HashMap<String, Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl MockSite {
    fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert(HOME.to_string(), HOME_HTML.to_string());
        pages.insert(NOVEL.to_string(), NOVEL_HTML.to_string());
        pages.insert(CH1.to_string(), chapter_html(1, 8, Some(CH2)));
        pages.insert(CH2.to_string(), chapter_html(2, 200, None));
        Self {
            pages,
            gates: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn gate(mut self, url: &str) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.insert(url.to_string(), gate.clone());
        (self, gate)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockSite {
    async fn fetch(&self, url: &CanonicalUrl) -> ScrapeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(url.as_str()) {
            let _permit = gate.acquire().await.map_err(|e| ScrapeError::network(url.as_str(), e.to_string()))?;
        }
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScrapeError::network(url.as_str(), "unexpected status 404 Not Found"))
    }
}

fn context(site: Arc<MockSite>) -> AppContext {
    let mut config = Config::default();
    config.scraper.backoff_base_ms = 1;
    AppContext::with_fetcher(config, site).unwrap()
}

#[tokio::test]
async fn test_latest_updates_single_row() {
    let ctx = context(Arc::new(MockSite::new()));
    let latest = ctx.library.latest_updates().await.unwrap();

    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].title, "Novel 1");
    let chapter = latest[0].latest_chapter.as_ref().unwrap();
    assert_eq!(chapter.title, "Chapter 1");
    assert_eq!(chapter.url.as_str(), CH1);
}

#[tokio::test]
async fn test_novel_detail_and_neighbors() {
    let ctx = context(Arc::new(MockSite::new()));
    let id = ctx.library.novel_id(NOVEL).unwrap();
    let novel = ctx.library.novel(&id).await.unwrap();

    assert_eq!(novel.title, "Novel 1");
    assert_eq!(novel.chapters.len(), 2);
    let ch1 = ctx.library.chapter_id(CH1).unwrap();
    let (prev, next) = novel.neighbors(&ch1);
    assert!(prev.is_none());
    assert_eq!(next.unwrap().url.slug(), "chapter-2");
}

#[tokio::test]
async fn test_read_chapter_then_navigate_next() {
    let (site, gate) = MockSite::new().gate(CH2);
    let site = Arc::new(site);
    let ctx = context(site.clone());
    let reader = Arc::new(Reader::new(ctx.library.clone(), &ctx.config.reader));

    let chapter = reader.open(ctx.library.chapter_id(CH1).unwrap()).await.unwrap();
    assert_eq!(chapter.paragraphs.len(), 8);
    assert_eq!(chapter.next_url.as_ref().unwrap().as_str(), CH2);

    let mut states = reader.subscribe();
    let task = tokio::spawn({
        let reader = reader.clone();
        async move { reader.navigate_next().await }
    });

    let loading = states
        .wait_for(|s| matches!(s, ReaderState::Loading(_)))
        .await
        .unwrap()
        .clone();
    match loading {
        ReaderState::Loading(id) => assert_eq!(id.slug(), "chapter-2"),
        other => panic!("expected loading, got {other:?}"),
    }

    gate.add_permits(1);
    let next = task.await.unwrap().unwrap();
    assert_eq!(next.paragraphs.len(), 200);
    assert!(next.next_url.is_none());

    let before = reader.state();
    let err = reader.navigate_next().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(reader.state(), before);
    assert_eq!(site.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_opens_share_one_fetch() {
    let (site, gate) = MockSite::new().gate(CH1);
    let site = Arc::new(site);
    let ctx = context(site.clone());
    let id = ctx.library.chapter_id(CH1).unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let library = ctx.library.clone();
            let id = id.clone();
            tokio::spawn(async move { library.chapter(&id).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.add_permits(1);

    let results: Vec<_> = futures::future::join_all(tasks).await;
    let chapters: Vec<_> = results.into_iter().map(|r| r.unwrap().unwrap()).collect();
    assert!(chapters.iter().all(|c| Arc::ptr_eq(c, &chapters[0])));
    assert_eq!(site.calls(), 1);
}

#[tokio::test]
async fn test_scrolling_prefetches_next_chapter() {
    let site = Arc::new(MockSite::new());
    let ctx = context(site.clone());
    let reader = Reader::new(ctx.library.clone(), &ctx.config.reader);

    let chapter = reader.open(ctx.library.chapter_id(CH1).unwrap()).await.unwrap();
    let mut viewport = Viewport::new(80, 40, ctx.config.reader.overscan);
    viewport.load(chapter);
    viewport.visible_lines();

    // eight short paragraphs fit on one screen
    assert!(reader.note_scroll(&viewport));
    assert!(!reader.note_scroll(&viewport));

    let next = ctx.library.chapter_id(CH2).unwrap();
    for _ in 0..200 {
        if ctx.library.chapter_cache().contains(next.url()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(ctx.library.chapter_cache().contains(next.url()));

    // the prefetched chapter is served from the cache
    reader.navigate_next().await.unwrap();
    assert_eq!(site.calls(), 2);
}

#[tokio::test]
async fn test_missing_chapter_surfaces_error_state() {
    let site = Arc::new(MockSite::new());
    let ctx = context(site.clone());
    let reader = Reader::new(ctx.library.clone(), &ctx.config.reader);
    let target = ctx
        .library
        .chapter_id("https://chireads.com/category/translatedtales/novel-1/chapter-99/")
        .unwrap();

    let err = reader.open(target.clone()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    // one attempt plus the configured retries
    assert_eq!(site.calls(), 1 + ctx.config.scraper.max_retries as usize);
    match reader.state() {
        ReaderState::Error { target: t, .. } => assert_eq!(t, target),
        other => panic!("expected error, got {other:?}"),
    }
}
