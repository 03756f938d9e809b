use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chireader::app::ErrorKind;
use chireader::domain::SourceSite;
use chireader::fetcher::{Fetcher, HttpFetcher};
use chireader::scraper::{ScraperConfig, SiteScraper};

const CHAPTER_HTML: &str = r##"<!doctype html>
<html>
  <body>
    <div class="article-title">Chapitre 1</div>
    <div id="content">
      <p>Premier paragraphe.</p>
      <div class="ads">pub</div>
      <p>Second paragraphe.</p>
    </div>
    <div class="article-function">
      <a href="#">Précédent</a>
      <a href="/category/translatedtales/novel-1/">Sommaire</a>
      <a href="/category/translatedtales/novel-1/chapter-2/">Suivant</a>
    </div>
  </body>
</html>
"##;

struct TestServer {
    base_url: String,
    requests: Arc<AtomicUsize>,
    shutdown: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl TestServer {
    fn start() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(AtomicUsize::new(0));
        let (shutdown, shutdown_rx) = mpsc::channel::<()>();

        let counter = requests.clone();
        let handle = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let (status, body) = match request.url() {
                "/category/translatedtales/novel-1/chapter-1/" => (200, CHAPTER_HTML),
                "/slow/" => {
                    thread::sleep(Duration::from_millis(2500));
                    (200, "too late")
                }
                _ => (404, "not found"),
            };
            let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
                .expect("build header");
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        });

        Self {
            base_url,
            requests,
            shutdown,
            handle,
        }
    }

    fn config(&self) -> ScraperConfig {
        ScraperConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 1,
            max_retries: 0,
            backoff_base_ms: 1,
            ..Default::default()
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.join();
    }
}

#[tokio::test]
async fn test_fetches_and_parses_chapter_over_http() {
    let server = TestServer::start();
    let scraper = SiteScraper::from_config(&server.config()).unwrap();

    let chapter = scraper
        .chapter(&format!(
            "{}/category/translatedtales/novel-1/chapter-1/?utm_source=feed",
            server.base_url
        ))
        .await
        .unwrap();

    assert_eq!(chapter.title, "Chapitre 1");
    assert_eq!(chapter.paragraphs, vec!["Premier paragraphe.", "Second paragraphe."]);
    assert!(chapter.prev_url.is_none());
    assert_eq!(chapter.next_url.unwrap().slug(), "chapter-2");
    assert_eq!(server.requests(), 1);
    server.stop();
}

#[tokio::test]
async fn test_non_success_status_is_network_error() {
    let server = TestServer::start();
    let config = server.config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let url = config.site().unwrap().canonicalize(&format!("{}/missing", server.base_url)).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.cause.contains("404"));
    assert_eq!(err.source_url, url.as_str());
    server.stop();
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = TestServer::start();
    let config = server.config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let url = config.site().unwrap().canonicalize(&format!("{}/slow/", server.base_url)).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.cause.contains("timed out"));
    server.stop();
}

#[tokio::test]
async fn test_foreign_host_is_rejected_before_request() {
    let server = TestServer::start();
    let fetcher = HttpFetcher::new(&server.config()).unwrap();
    let foreign = SourceSite::default()
        .canonicalize("https://chireads.com/category/translatedtales/novel-1/chapter-1/")
        .unwrap();

    let err = fetcher.fetch(&foreign).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidUrl);
    assert_eq!(server.requests(), 0);
    server.stop();
}

#[tokio::test]
async fn test_unreachable_site_is_network_error() {
    // bind then drop to get a port nobody listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let config = ScraperConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        timeout_secs: 1,
        max_retries: 1,
        backoff_base_ms: 1,
        ..Default::default()
    };
    let scraper = SiteScraper::from_config(&config).unwrap();

    let err = scraper.latest_updates().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}
