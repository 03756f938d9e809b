use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::domain::url::{slug_to_title, ChapterId};

/// A parsed chapter page.
///
/// `paragraphs` is never empty and keeps source order. Navigation links
/// never point back at `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub prev_url: Option<ChapterId>,
    pub next_url: Option<ChapterId>,
}

impl Chapter {
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev_url.is_some()
    }

    /// The page title, or one built from the URL slug when the page had
    /// none.
    pub fn display_title(&self) -> Cow<'_, str> {
        if self.title.is_empty() {
            Cow::Owned(slug_to_title(self.id.slug()))
        } else {
            Cow::Borrowed(&self.title)
        }
    }
}
