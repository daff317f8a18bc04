//! Display paging
//!
//! The local screen shows a fixed number of channels at once. Channels are
//! grouped into consecutive pages; advancing past the last page wraps to
//! the first.

use core::ops::Range;

/// Which group of channels is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageCursor {
    page: u8,
    page_count: u8,
    channels: usize,
    per_page: usize,
}

impl PageCursor {
    /// Create a cursor over `channels` channels, `per_page` per page
    ///
    /// There is always at least one page, even without channels.
    pub fn new(channels: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let pages = channels.div_ceil(per_page).max(1);
        Self {
            page: 0,
            page_count: u8::try_from(pages).unwrap_or(u8::MAX),
            channels,
            per_page,
        }
    }

    /// Current page (0-based)
    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn page_count(&self) -> u8 {
        self.page_count
    }

    /// Select a page, wrapping out-of-range values
    pub fn set_page(&mut self, page: u8) {
        self.page = page % self.page_count;
    }

    /// Move to the next page, wrapping after the last
    pub fn advance(&mut self) -> u8 {
        self.page = (self.page + 1) % self.page_count;
        self.page
    }

    /// Channel positions (0-based) shown on the current page
    pub fn channels(&self) -> Range<usize> {
        let start = self.page as usize * self.per_page;
        let end = (start + self.per_page).min(self.channels);
        start.min(end)..end
    }

    /// Channels shown per page
    pub fn per_page(&self) -> usize {
        self.per_page
    }
}
