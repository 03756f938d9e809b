use std::collections::HashSet;
use std::sync::LazyLock;

use ::scraper::{Html, Selector};

use super::{element_text, image_source, link_target, non_empty, selector};
use crate::app::{ScrapeError, ScrapeResult};
use crate::domain::{CanonicalUrl, ChapterId, ChapterRef, NovelDetail, NovelId, SourceSite};

const TITLE: &str = ".inform-title";
const TITLE_FALLBACK: &str = "h1";
const CHAPTER_LIST: &str = "ul.chapitre";
const CHAPTER_LINK: &str = "li a";

const AUTHOR_LABELS: [&str; 3] = ["auteur", "author", "écrit par"];

struct Selectors {
    title: Selector,
    title_fallback: Selector,
    cover: Selector,
    author: Selector,
    description: Selector,
    chapter_list: Selector,
    chapter_link: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    title: selector(TITLE),
    title_fallback: selector(TITLE_FALLBACK),
    cover: selector(".inform-product img"),
    author: selector(".inform-inform-data h6"),
    description: selector(".inform-txt-show"),
    chapter_list: selector(CHAPTER_LIST),
    chapter_link: selector(CHAPTER_LINK),
});

/// Parse a novel page into its metadata and ordered chapter list.
pub fn parse_novel_detail(
    html: &str,
    page: &CanonicalUrl,
    site: &SourceSite,
) -> ScrapeResult<NovelDetail> {
    let document = Html::parse_document(html);

    let title = document
        .select(&SELECTORS.title)
        .chain(document.select(&SELECTORS.title_fallback))
        .map(|el| element_text(&el))
        .find(|t| !t.is_empty())
        .ok_or_else(|| ScrapeError::missing(page.as_str(), TITLE))?;

    let cover_url = document
        .select(&SELECTORS.cover)
        .find_map(|img| image_source(page, &img));

    let author = document
        .select(&SELECTORS.author)
        .next()
        .map(|el| strip_author_label(&element_text(&el)))
        .and_then(non_empty);

    let description = document
        .select(&SELECTORS.description)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let list = document
        .select(&SELECTORS.chapter_list)
        .next()
        .ok_or_else(|| ScrapeError::missing(page.as_str(), CHAPTER_LIST))?;

    let mut seen = HashSet::new();
    let chapters: Vec<ChapterRef> = list
        .select(&SELECTORS.chapter_link)
        .filter_map(|anchor| {
            let url = link_target(site, page, &anchor)?;
            if !seen.insert(url.clone()) {
                return None;
            }
            let title = non_empty(element_text(&anchor)).unwrap_or_else(|| url.slug().to_string());
            Some(ChapterRef {
                title,
                url: ChapterId::new(url),
            })
        })
        .collect();

    if chapters.is_empty() {
        return Err(ScrapeError::missing(
            page.as_str(),
            &format!("{} {}", CHAPTER_LIST, CHAPTER_LINK),
        ));
    }

    Ok(NovelDetail {
        id: NovelId::new(page.clone()),
        title,
        cover_url,
        author,
        description,
        chapters,
    })
}

/// `Auteur : Someone` → `Someone`.
fn strip_author_label(text: &str) -> String {
    if let Some((label, rest)) = text.split_once(':') {
        let label = label.trim().to_lowercase();
        if AUTHOR_LABELS.iter().any(|l| label == *l) {
            return rest.trim().to_string();
        }
    }
    text.trim().to_string()
}
