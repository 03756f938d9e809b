//! Chapter reader state machine.
//!
//! ```text
//!            open(id)                 Ok(chapter)
//!   Idle ─────────────▶ Loading(id) ─────────────▶ Displaying(chapter)
//!                          │    ▲                      │
//!                   Err(e) │    │ retry()              │ navigate_next/prev
//!                          ▼    │                      ▼
//!                     Error{target, error}          Loading(link)
//! ```
//!
//! The state lives in a `watch` channel so the UI can render whatever is
//! current without holding locks across fetches. A result that arrives
//! after the reader moved on to another chapter is dropped; it still
//! lands in the chapter cache.

pub mod viewport;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::app::{ScrapeError, ScrapeResult};
use crate::cache::Library;
use crate::domain::{Chapter, ChapterId};

pub use viewport::Viewport;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Paragraphs laid out beyond each edge of the screen.
    pub overscan: usize,
    /// Scroll progress at which the next chapter is prefetched.
    pub prefetch_threshold: f32,
    pub tick_rate_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            overscan: 4,
            prefetch_threshold: 0.8,
            tick_rate_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReaderState {
    Idle,
    Loading(ChapterId),
    Displaying(Arc<Chapter>),
    Error { target: ChapterId, error: ScrapeError },
}

impl ReaderState {
    pub fn chapter(&self) -> Option<&Arc<Chapter>> {
        match self {
            ReaderState::Displaying(chapter) => Some(chapter),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ReaderState::Loading(_))
    }
}

pub struct Reader {
    library: Library,
    state: watch::Sender<ReaderState>,
    prefetched: Mutex<Option<ChapterId>>,
    prefetch_threshold: f32,
}

impl Reader {
    pub fn new(library: Library, config: &ReaderConfig) -> Self {
        let (state, _) = watch::channel(ReaderState::Idle);
        Self {
            library,
            state,
            prefetched: Mutex::new(None),
            prefetch_threshold: config.prefetch_threshold,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn state(&self) -> ReaderState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReaderState> {
        self.state.subscribe()
    }

    pub async fn open(&self, id: ChapterId) -> ScrapeResult<Arc<Chapter>> {
        debug!("opening {}", id);
        self.state.send_replace(ReaderState::Loading(id.clone()));

        let result = self.library.chapter(&id).await;

        let outcome = result.clone();
        self.state.send_if_modified(move |state| {
            if !matches!(state, ReaderState::Loading(current) if *current == id) {
                debug!("discarding stale result for {}", id);
                return false;
            }
            *state = match outcome {
                Ok(chapter) => ReaderState::Displaying(chapter),
                Err(error) => ReaderState::Error { target: id, error },
            };
            true
        });
        result
    }

    /// Open the displayed chapter's next link.
    pub async fn navigate_next(&self) -> ScrapeResult<Arc<Chapter>> {
        let target = self.link(|c| c.next_url.clone(), "next")?;
        self.open(target).await
    }

    pub async fn navigate_prev(&self) -> ScrapeResult<Arc<Chapter>> {
        let target = self.link(|c| c.prev_url.clone(), "previous")?;
        self.open(target).await
    }

    /// Re-open the chapter that failed. `None` when not in an error state.
    pub async fn retry(&self) -> Option<ScrapeResult<Arc<Chapter>>> {
        let target = match &*self.state.borrow() {
            ReaderState::Error { target, .. } => target.clone(),
            _ => return None,
        };
        info!("retrying {}", target);
        Some(self.open(target).await)
    }

    /// Prefetch the next chapter once the viewport nears the end of the
    /// displayed one. Returns whether a prefetch was started.
    pub fn note_scroll(&self, viewport: &Viewport) -> bool {
        let next = {
            let state = self.state.borrow();
            let Some(chapter) = state.chapter() else {
                return false;
            };
            if viewport.chapter_id() != Some(&chapter.id) {
                return false;
            }
            match &chapter.next_url {
                Some(next) => next.clone(),
                None => return false,
            }
        };

        if !viewport.in_trailing_margin(self.prefetch_threshold) {
            return false;
        }

        let mut prefetched = self.prefetched.lock().unwrap_or_else(|e| e.into_inner());
        if prefetched.as_ref() == Some(&next) {
            return false;
        }
        *prefetched = Some(next.clone());
        drop(prefetched);

        self.library.prefetch_chapter(next);
        true
    }

    fn link(
        &self,
        pick: impl FnOnce(&Chapter) -> Option<ChapterId>,
        direction: &str,
    ) -> ScrapeResult<ChapterId> {
        match &*self.state.borrow() {
            ReaderState::Displaying(chapter) => pick(chapter).ok_or_else(|| {
                ScrapeError::not_found(chapter.id.as_str(), format!("no {direction} chapter"))
            }),
            ReaderState::Loading(id) | ReaderState::Error { target: id, .. } => Err(
                ScrapeError::not_found(id.as_str(), format!("no {direction} chapter while not displaying")),
            ),
            ReaderState::Idle => Err(ScrapeError::not_found("", "no chapter open")),
        }
    }
}
