use std::collections::HashSet;
use std::sync::LazyLock;

use ::scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{element_text, image_source, link_target, non_empty, selector};
use crate::app::{ScrapeError, ScrapeResult};
use crate::domain::{
    CanonicalUrl, ChapterId, ChapterRef, FeaturedNovel, HomePage, NovelId, NovelSummary,
    SourceSite, UpdatedAt,
};

const LATEST_CONTAINER: &str = ".dernieres-tabel";

struct Selectors {
    latest_container: Selector,
    row: Selector,
    cell: Selector,
    anchor: Selector,
    featured_item: Selector,
    image: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    latest_container: selector(LATEST_CONTAINER),
    row: selector("tr"),
    cell: selector("td"),
    anchor: selector("a"),
    featured_item: selector(".recommended-list li"),
    image: selector("img"),
});

/// Parse the home page: featured list (optional) and latest updates.
pub fn parse_home(html: &str, page: &CanonicalUrl, site: &SourceSite) -> ScrapeResult<HomePage> {
    let document = Html::parse_document(html);
    let latest = latest_from_document(&document, page, site)?;
    let featured = featured_from_document(&document, page, site);
    Ok(HomePage { featured, latest })
}

/// Parse only the latest-updates table.
pub fn parse_latest_updates(
    html: &str,
    page: &CanonicalUrl,
    site: &SourceSite,
) -> ScrapeResult<Vec<NovelSummary>> {
    let document = Html::parse_document(html);
    latest_from_document(&document, page, site)
}

fn latest_from_document(
    document: &Html,
    page: &CanonicalUrl,
    site: &SourceSite,
) -> ScrapeResult<Vec<NovelSummary>> {
    let container = document
        .select(&SELECTORS.latest_container)
        .next()
        .ok_or_else(|| ScrapeError::missing(page.as_str(), LATEST_CONTAINER))?;

    let mut summaries = Vec::new();
    let mut skipped = 0usize;

    for row in container.select(&SELECTORS.row) {
        let cells: Vec<ElementRef<'_>> = row.select(&SELECTORS.cell).collect();
        if cells.is_empty() {
            // header row
            continue;
        }
        match parse_row(&cells, page, site) {
            Some(summary) => summaries.push(summary),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            "skipped {} latest-update rows without a title link on {}",
            skipped, page
        );
    }

    Ok(summaries)
}

fn parse_row(cells: &[ElementRef<'_>], page: &CanonicalUrl, site: &SourceSite) -> Option<NovelSummary> {
    // (cell index, target, text) for every anchor leading to another page
    let links: Vec<(usize, CanonicalUrl, String)> = cells
        .iter()
        .enumerate()
        .flat_map(|(idx, cell)| {
            cell.select(&SELECTORS.anchor).filter_map(move |a| {
                let target = link_target(site, page, &a)?;
                Some((idx, target, element_text(&a)))
            })
        })
        .collect();

    let title_pos = links.iter().position(|(_, _, text)| !text.is_empty())?;
    let (title_cell, novel_url, title) = links[title_pos].clone();

    let latest_chapter = links[title_pos + 1..]
        .iter()
        .find(|(_, url, _)| url != &novel_url)
        .map(|(_, url, text)| ChapterRef {
            title: text.clone(),
            url: ChapterId::new(url.clone()),
        });

    let linked_cells: HashSet<usize> = links.iter().map(|(idx, _, _)| *idx).collect();
    let last = cells.len() - 1;

    let author = cells
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != last && *idx != title_cell && !linked_cells.contains(idx))
        .find_map(|(_, cell)| non_empty(element_text(cell)));

    let updated_at = if last != title_cell && !linked_cells.contains(&last) {
        UpdatedAt::parse(&element_text(&cells[last]))
    } else {
        None
    };

    Some(NovelSummary {
        id: NovelId::new(novel_url),
        title,
        latest_chapter,
        author,
        updated_at,
    })
}

fn featured_from_document(document: &Html, page: &CanonicalUrl, site: &SourceSite) -> Vec<FeaturedNovel> {
    let mut seen = HashSet::new();
    let mut featured = Vec::new();

    for item in document.select(&SELECTORS.featured_item) {
        let Some((anchor, url)) = item
            .select(&SELECTORS.anchor)
            .find_map(|a| link_target(site, page, &a).map(|url| (a, url)))
        else {
            continue;
        };

        let image = item.select(&SELECTORS.image).next();
        let title = non_empty(element_text(&anchor))
            .or_else(|| anchor.value().attr("title").map(|t| t.trim().to_string()))
            .or_else(|| image.and_then(|img| img.value().attr("alt")).map(|t| t.trim().to_string()))
            .filter(|t| !t.is_empty());
        let Some(title) = title else {
            continue;
        };

        if !seen.insert(url.clone()) {
            continue;
        }

        featured.push(FeaturedNovel {
            id: NovelId::new(url),
            title,
            cover_url: image.and_then(|img| image_source(page, &img)),
        });
    }

    featured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ErrorKind;

    const HOME_HTML: &str = r##"
    <html>
        <body>
            <ul class="recommended-list">
                <li><a href="https://chireads.com/category/translatedtales/super-gene/"><img src="/covers/sg.jpg" alt="Super Gene"></a></li>
                <li><a href="https://chireads.com/category/translatedtales/super-gene/" title="Super Gene">x</a></li>
                <li><a href="/category/original/mon-roman/">Mon Roman</a></li>
            </ul>
            <div class="dernieres-tabel">
                <table>
                    <tr><th>Titre</th><th>Chapitre</th></tr>
                    <tr>
                        <td><a href="https://chireads.com/category/translatedtales/novel-1/">Novel 1</a></td>
                        <td><a href="https://chireads.com/category/translatedtales/novel-1/chapter-1/">Chapter 1</a></td>
                        <td>Author</td>
                        <td><a href="#">2023-10-27</a></td>
                    </tr>
                </table>
            </div>
        </body>
    </html>
    "##;

    fn home() -> CanonicalUrl {
        SourceSite::default().home()
    }

    #[test]
    fn test_single_row_scenario() {
        let site = SourceSite::default();
        let latest = parse_latest_updates(HOME_HTML, &home(), &site).unwrap();
        assert_eq!(latest.len(), 1);

        let novel = &latest[0];
        assert_eq!(novel.title, "Novel 1");
        assert_eq!(novel.id.slug(), "novel-1");
        let chapter = novel.latest_chapter.as_ref().unwrap();
        assert_eq!(chapter.title, "Chapter 1");
        assert_eq!(
            chapter.url.as_str(),
            "https://chireads.com/category/translatedtales/novel-1/chapter-1/"
        );
        assert_eq!(novel.author.as_deref(), Some("Author"));
        assert_eq!(
            novel.updated_at,
            Some(UpdatedAt::Date(chrono::NaiveDate::from_ymd_opt(2023, 10, 27).unwrap()))
        );
    }

    #[test]
    fn test_rows_without_title_link_are_skipped() {
        let html = r#"
        <div class="dernieres-tabel"><table>
            <tr><td>no link here</td><td>2023-01-01</td></tr>
            <tr><td><a href="/category/translatedtales/b/">B</a></td><td>Someone</td><td>hier</td></tr>
        </table></div>"#;
        let latest = parse_latest_updates(html, &home(), &SourceSite::default()).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].title, "B");
        assert!(latest[0].latest_chapter.is_none());
        assert_eq!(latest[0].author.as_deref(), Some("Someone"));
        assert_eq!(latest[0].updated_at, Some(UpdatedAt::Raw("hier".into())));
    }

    #[test]
    fn test_missing_container_is_parse_error() {
        let err = parse_latest_updates("<html><body>Mock Home</body></html>", &home(), &SourceSite::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.cause.contains(".dernieres-tabel"));
    }

    #[test]
    fn test_empty_table_is_not_an_error() {
        let latest = parse_latest_updates(
            r#"<div class="dernieres-tabel"><table></table></div>"#,
            &home(),
            &SourceSite::default(),
        )
        .unwrap();
        assert!(latest.is_empty());
    }

    #[test]
    fn test_featured_list_is_deduplicated() {
        let page = parse_home(HOME_HTML, &home(), &SourceSite::default()).unwrap();
        assert_eq!(page.featured.len(), 2);
        assert_eq!(page.featured[0].title, "Super Gene");
        assert_eq!(
            page.featured[0].cover_url.as_deref(),
            Some("https://chireads.com/covers/sg.jpg")
        );
        assert_eq!(page.featured[1].title, "Mon Roman");
        assert!(page.featured[1].cover_url.is_none());
        assert_eq!(page.latest.len(), 1);
    }
}
