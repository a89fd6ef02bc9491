//! Page-window arithmetic for the thread table.
//!
//! The page index is *not* reset when the list grows, so the view stays put
//! while new pages stream in.  It is clamped whenever the list shrinks below
//! it.

use std::ops::Range;

/// Page sizes the user can cycle through.
pub const PAGE_SIZES: [usize; 5] = [10, 20, 30, 40, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    index: usize,
    size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PAGE_SIZES[0])
    }
}

impl Pager {
    /// Sizes outside [`PAGE_SIZES`] fall back to the smallest one.
    pub fn new(size: usize) -> Self {
        let size = if PAGE_SIZES.contains(&size) {
            size
        } else {
            PAGE_SIZES[0]
        };
        Self { index: 0, size }
    }

    /// Zero-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of pages for `len` rows; an empty list still has one page.
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.size).max(1)
    }

    /// Row range shown on the current page.
    pub fn visible(&self, len: usize) -> Range<usize> {
        let start = (self.index * self.size).min(len);
        let end = (start + self.size).min(len);
        start..end
    }

    pub fn can_previous(&self) -> bool {
        self.index > 0
    }

    pub fn can_next(&self, len: usize) -> bool {
        self.index + 1 < self.page_count(len)
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn next(&mut self, len: usize) {
        if self.can_next(len) {
            self.index += 1;
        }
    }

    pub fn last(&mut self, len: usize) {
        self.index = self.page_count(len) - 1;
    }

    /// Jump to a one-based page number, clamped into range.
    pub fn jump_to(&mut self, page: usize, len: usize) {
        self.index = page.saturating_sub(1).min(self.page_count(len) - 1);
    }

    /// Advance to the next entry of [`PAGE_SIZES`], wrapping around, and go
    /// back to the first page.
    pub fn cycle_size(&mut self, forward: bool) {
        let pos = PAGE_SIZES.iter().position(|s| *s == self.size).unwrap_or(0);
        let next = if forward {
            (pos + 1) % PAGE_SIZES.len()
        } else {
            (pos + PAGE_SIZES.len() - 1) % PAGE_SIZES.len()
        };
        self.size = PAGE_SIZES[next];
        self.index = 0;
    }

    /// Pull the index back inside the list after it shrank.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(self.page_count(len) - 1);
    }
}
