use std::sync::Arc;

use crate::domain::{Chapter, NovelDetail};
use crate::reader::{ReaderState, Viewport};

/// Messages from background reader tasks back to the UI loop.
#[derive(Debug)]
pub enum UiMessage {
    Status(String),
    Novel(Arc<NovelDetail>),
}

pub struct TuiApp {
    pub viewport: Viewport,
    pub novel: Option<Arc<NovelDetail>>,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl TuiApp {
    pub fn new(overscan: usize) -> Self {
        Self {
            viewport: Viewport::new(80, 24, overscan),
            novel: None,
            should_quit: false,
            status_message: None,
        }
    }

    /// Point the viewport at the displayed chapter when it changes.
    pub fn sync(&mut self, state: &ReaderState) -> bool {
        let Some(chapter) = state.chapter() else {
            return false;
        };
        if self.viewport.chapter_id() == Some(&chapter.id) {
            return false;
        }
        self.viewport.load(chapter.clone());
        self.status_message = None;
        true
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some(msg);
    }

    pub fn handle_message(&mut self, message: UiMessage) {
        match message {
            UiMessage::Status(msg) => self.set_status(msg),
            UiMessage::Novel(novel) => self.novel = Some(novel),
        }
    }

    /// `"12/340"` when the chapter appears in the loaded chapter list.
    pub fn position(&self, chapter: &Chapter) -> Option<String> {
        let novel = self.novel.as_ref()?;
        let index = novel.position_of(&chapter.id)?;
        Some(format!("{}/{}", index + 1, novel.chapters.len()))
    }
}
