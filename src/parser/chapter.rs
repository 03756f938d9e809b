use std::sync::LazyLock;

use ::scraper::{Html, Selector};

use super::{element_text, link_target, selector};
use crate::app::{ScrapeError, ScrapeResult};
use crate::domain::{CanonicalUrl, Chapter, ChapterId, SourceSite};

const TITLE: &str = ".article-title";
const CONTENT: &str = "#content";
const PARAGRAPH: &str = "#content p";

struct Selectors {
    title: Selector,
    title_fallback: Selector,
    content: Selector,
    paragraph: Selector,
    navigation: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    title: selector(TITLE),
    title_fallback: selector("h1"),
    content: selector(CONTENT),
    paragraph: selector("p"),
    navigation: selector(".article-function a"),
});

/// Parse a chapter page.
///
/// Only `<p>` elements inside the content container become paragraphs, so
/// ad blocks and scripts between them are ignored. Navigation anchors are
/// matched by position: the first is "previous", the last is "next".
pub fn parse_chapter(html: &str, page: &CanonicalUrl, site: &SourceSite) -> ScrapeResult<Chapter> {
    let document = Html::parse_document(html);

    let title = document
        .select(&SELECTORS.title)
        .chain(document.select(&SELECTORS.title_fallback))
        .map(|el| element_text(&el))
        .find(|t| !t.is_empty())
        .ok_or_else(|| ScrapeError::missing(page.as_str(), TITLE))?;

    let content = document
        .select(&SELECTORS.content)
        .next()
        .ok_or_else(|| ScrapeError::missing(page.as_str(), CONTENT))?;

    let paragraphs: Vec<String> = content
        .select(&SELECTORS.paragraph)
        .map(|p| element_text(&p))
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        return Err(ScrapeError::missing(page.as_str(), PARAGRAPH));
    }

    let anchors: Vec<_> = document.select(&SELECTORS.navigation).collect();
    let (prev_url, next_url) = match anchors.as_slice() {
        [first, .., last] => (
            link_target(site, page, first).map(ChapterId::new),
            link_target(site, page, last).map(ChapterId::new),
        ),
        _ => (None, None),
    };

    Ok(Chapter {
        id: ChapterId::new(page.clone()),
        title,
        paragraphs,
        prev_url,
        next_url,
    })
}
