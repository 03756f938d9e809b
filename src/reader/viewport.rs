//! Virtualized paragraph viewport.
//!
//! Only paragraphs inside the visible window (plus `overscan` on each
//! side) are ever wrapped. Wrapped paragraphs live in a fixed pool of
//! slots; a slot whose paragraph scrolls out of the window is reused for
//! the next paragraph that needs laying out.

use std::ops::Range;
use std::sync::Arc;

use crate::domain::{Chapter, ChapterId};

/// Blank lines rendered after each paragraph.
const PARAGRAPH_GAP: usize = 1;

#[derive(Debug, Default)]
struct Slot {
    paragraph: Option<usize>,
    lines: Vec<String>,
}

#[derive(Debug)]
pub struct Viewport {
    chapter: Option<Arc<Chapter>>,
    width: u16,
    height: u16,
    overscan: usize,
    top: usize,
    top_line: usize,
    last_visible: usize,
    slots: Vec<Slot>,
    layouts: usize,
}

impl Viewport {
    pub fn new(width: u16, height: u16, overscan: usize) -> Self {
        let mut viewport = Self {
            chapter: None,
            width: width.max(1),
            height: height.max(1),
            overscan,
            top: 0,
            top_line: 0,
            last_visible: 0,
            slots: Vec::new(),
            layouts: 0,
        };
        viewport.reset_slots();
        viewport
    }

    /// Show a new chapter from its first line.
    pub fn load(&mut self, chapter: Arc<Chapter>) {
        self.chapter = Some(chapter);
        self.reset();
    }

    /// Back to the first line with every slot released.
    pub fn reset(&mut self) {
        self.top = 0;
        self.top_line = 0;
        self.reset_slots();
        self.settle();
    }

    pub fn chapter_id(&self) -> Option<&ChapterId> {
        self.chapter.as_ref().map(|c| &c.id)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        let rewrap = width != self.width;
        self.width = width;
        self.height = height;
        if rewrap {
            self.reset_slots();
            self.top_line = 0;
        } else {
            self.slots.resize_with(self.capacity(), Slot::default);
        }
        self.settle();
    }

    /// Maximum number of wrapped paragraphs held at once.
    pub fn capacity(&self) -> usize {
        self.height as usize + 2 * self.overscan
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total paragraph wraps performed since creation.
    pub fn layouts(&self) -> usize {
        self.layouts
    }

    pub fn paragraph_count(&self) -> usize {
        self.chapter.as_ref().map_or(0, |c| c.paragraphs.len())
    }

    pub fn top(&self) -> (usize, usize) {
        (self.top, self.top_line)
    }

    /// Paragraph range currently backed by laid-out slots.
    pub fn window(&self) -> Range<usize> {
        let count = self.paragraph_count();
        if count == 0 {
            return 0..0;
        }
        let start = self.top.saturating_sub(self.overscan);
        let end = (self.last_visible + 1 + self.overscan).min(count);
        start..end
    }

    /// Fraction of paragraphs reached by the bottom of the screen.
    pub fn progress(&self) -> f32 {
        let count = self.paragraph_count();
        if count == 0 {
            return 0.0;
        }
        (self.last_visible + 1) as f32 / count as f32
    }

    /// True once the bottom of the screen is within the trailing
    /// `1 - threshold` share of the chapter.
    pub fn in_trailing_margin(&self, threshold: f32) -> bool {
        self.paragraph_count() > 0 && self.progress() >= threshold
    }

    pub fn at_end(&mut self) -> bool {
        let count = self.paragraph_count();
        count == 0 || (self.last_visible + 1 >= count && self.remaining_lines() == 0)
    }

    pub fn visible_lines(&mut self) -> Vec<String> {
        let count = self.paragraph_count();
        let height = self.height as usize;
        let mut lines = Vec::with_capacity(height);
        let mut index = self.top;
        let mut skip = self.top_line;

        while lines.len() < height && index < count {
            let slot = self.slot_for(index);
            for line in self.slots[slot].lines.iter().skip(skip) {
                if lines.len() == height {
                    break;
                }
                lines.push(line.clone());
            }
            skip = 0;
            index += 1;
        }

        self.prepare_overscan();
        lines
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let count = self.paragraph_count();
        if count == 0 {
            return;
        }
        let mut remaining = lines;
        while remaining > 0 {
            let height = self.height_of(self.top);
            let left = height - self.top_line;
            if remaining < left {
                self.top_line += remaining;
                break;
            }
            if self.top + 1 >= count {
                self.top_line = height - 1;
                break;
            }
            remaining -= left;
            self.top += 1;
            self.top_line = 0;
        }
        self.settle();
        if self.last_visible + 1 >= count {
            let last = self.last_position();
            if (self.top, self.top_line) > last {
                (self.top, self.top_line) = last;
                self.settle();
            }
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let mut remaining = lines;
        while remaining > 0 {
            if remaining <= self.top_line {
                self.top_line -= remaining;
                break;
            }
            remaining -= self.top_line;
            if self.top == 0 {
                self.top_line = 0;
                break;
            }
            self.top -= 1;
            self.top_line = self.height_of(self.top);
        }
        self.settle();
    }

    pub fn page_down(&mut self) {
        self.scroll_down((self.height as usize).saturating_sub(1).max(1));
    }

    pub fn page_up(&mut self) {
        self.scroll_up((self.height as usize).saturating_sub(1).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.top = 0;
        self.top_line = 0;
        self.settle();
    }

    fn reset_slots(&mut self) {
        self.slots.clear();
        self.slots.resize_with(self.capacity(), Slot::default);
        self.last_visible = 0;
    }

    /// Text lines below the bottom edge of the screen.
    fn remaining_lines(&mut self) -> usize {
        let count = self.paragraph_count();
        if count == 0 {
            return 0;
        }
        let mut total = 0;
        for index in self.top..=self.last_visible.min(count - 1) {
            total += self.height_of(index);
        }
        if self.last_visible + 1 >= count {
            total = total.saturating_sub(PARAGRAPH_GAP);
        }
        total.saturating_sub(self.top_line + self.height as usize)
    }

    /// Furthest scroll position: the last text line sits on the bottom
    /// row, or the top of the chapter when it fits on one screen.
    fn last_position(&mut self) -> (usize, usize) {
        let count = self.paragraph_count();
        let height = self.height as usize;
        let mut below = 0;
        for index in (0..count).rev() {
            let mut lines = self.height_of(index);
            if index + 1 == count {
                lines = lines.saturating_sub(PARAGRAPH_GAP);
            }
            below += lines;
            if below >= height {
                return (index, below - height);
            }
        }
        (0, 0)
    }

    /// Recompute the last paragraph touching the screen.
    fn settle(&mut self) {
        let count = self.paragraph_count();
        if count == 0 {
            self.last_visible = 0;
            return;
        }
        let height = self.height as usize;
        let mut shown = 0;
        let mut index = self.top;
        let mut skip = self.top_line;
        loop {
            shown += self.height_of(index) - skip;
            skip = 0;
            if shown >= height || index + 1 >= count {
                break;
            }
            index += 1;
        }
        self.last_visible = index;
    }

    fn prepare_overscan(&mut self) {
        let count = self.paragraph_count();
        let before = self.top.saturating_sub(self.overscan)..self.top;
        let after = (self.last_visible + 1).min(count)..(self.last_visible + 1 + self.overscan).min(count);
        for index in before.chain(after) {
            self.slot_for(index);
        }
    }

    fn height_of(&mut self, index: usize) -> usize {
        let slot = self.slot_for(index);
        self.slots[slot].lines.len()
    }

    /// Find the slot holding `index`, laying it out in a recycled slot if
    /// needed.
    fn slot_for(&mut self, index: usize) -> usize {
        if let Some(pos) = self.slots.iter().position(|s| s.paragraph == Some(index)) {
            return pos;
        }

        let keep = self.top.saturating_sub(self.overscan)..(self.last_visible + 1 + self.overscan);
        let pos = self
            .slots
            .iter()
            .position(|s| s.paragraph.is_none())
            .or_else(|| {
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, s)| s.paragraph.map(|p| (pos, p)))
                    .filter(|(_, p)| !keep.contains(p))
                    .max_by_key(|(_, p)| p.abs_diff(self.top))
                    .map(|(pos, _)| pos)
            })
            .or_else(|| {
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, s)| s.paragraph.map(|p| (pos, p)))
                    .filter(|(_, p)| *p != index)
                    .max_by_key(|(_, p)| p.abs_diff(self.top))
                    .map(|(pos, _)| pos)
            })
            .unwrap_or(0);

        let text = self
            .chapter
            .as_ref()
            .and_then(|c| c.paragraphs.get(index))
            .map(String::as_str)
            .unwrap_or("");
        let mut lines = wrap(text, self.width as usize);
        lines.extend(std::iter::repeat(String::new()).take(PARAGRAPH_GAP));

        let slot = &mut self.slots[pos];
        slot.paragraph = Some(index);
        slot.lines = lines;
        self.layouts += 1;
        pos
    }
}

/// Wrap a paragraph to `width` terminal columns. Wide characters count
/// for two columns and words longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}
