//! Pure HTML → record parsers.
//!
//! Each parser takes the raw HTML of one page kind plus the page's own
//! canonical URL (for resolving relative links) and returns a typed record
//! or a `Parse` error naming the structural anchor that was missing.
//! Optional fields never fail a parse.

pub mod chapter;
pub mod home;
pub mod novel;

use ::scraper::{ElementRef, Selector};

use crate::domain::{CanonicalUrl, SourceSite};

pub use chapter::parse_chapter;
pub use home::{parse_home, parse_latest_updates};
pub use novel::parse_novel_detail;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector `{css}`: {e}"))
}

/// Text content with runs of whitespace collapsed to single spaces.
fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Resolve an anchor's href to another page on the site.
///
/// Missing, `#`, `javascript:` and foreign hrefs, as well as links back to
/// `page` itself, yield `None`.
fn link_target(site: &SourceSite, page: &CanonicalUrl, anchor: &ElementRef<'_>) -> Option<CanonicalUrl> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    match site.resolve(page, href) {
        Ok(url) if &url != page => Some(url),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("ignoring link {}: {}", href, e.cause);
            None
        }
    }
}

/// Resolve an image source without restricting it to the site; covers are
/// often served from a CDN.
fn image_source(page: &CanonicalUrl, image: &ElementRef<'_>) -> Option<String> {
    let src = image
        .value()
        .attr("data-src")
        .or_else(|| image.value().attr("src"))?
        .trim();
    if src.is_empty() {
        return None;
    }
    url::Url::parse(page.as_str())
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .ok()
}
