use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::url::{ChapterId, NovelId};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Update date from the latest-updates table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdatedAt {
    Date(NaiveDate),
    Raw(String),
}

impl UpdatedAt {
    /// Best-effort date parse; unparseable text is kept verbatim.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let parsed = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok());
        Some(match parsed {
            Some(date) => UpdatedAt::Date(date),
            None => UpdatedAt::Raw(text.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub title: String,
    pub url: ChapterId,
}

/// One row of the home page's latest-updates table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelSummary {
    pub id: NovelId,
    pub title: String,
    pub latest_chapter: Option<ChapterRef>,
    pub author: Option<String>,
    pub updated_at: Option<UpdatedAt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedNovel {
    pub id: NovelId,
    pub title: String,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePage {
    pub featured: Vec<FeaturedNovel>,
    pub latest: Vec<NovelSummary>,
}

/// A novel page with its full chapter list in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelDetail {
    pub id: NovelId,
    pub title: String,
    pub cover_url: Option<String>,
    pub author: Option<String>,
    pub description: String,
    pub chapters: Vec<ChapterRef>,
}

impl NovelDetail {
    pub fn position_of(&self, id: &ChapterId) -> Option<usize> {
        self.chapters.iter().position(|c| &c.url == id)
    }

    /// Neighbors according to the chapter list.
    ///
    /// A chapter page's own prev/next anchors take precedence; this is
    /// offered so callers can notice when the two disagree.
    pub fn neighbors(&self, id: &ChapterId) -> (Option<&ChapterRef>, Option<&ChapterRef>) {
        match self.position_of(id) {
            Some(idx) => (
                idx.checked_sub(1).and_then(|i| self.chapters.get(i)),
                self.chapters.get(idx + 1),
            ),
            None => (None, None),
        }
    }
}
