//! Server-driven pagination summary.

use serde::{Deserialize, Serialize};

/// Pagination state as reported by the API, clamped to internally consistent
/// values before it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self::single_page(0)
    }
}

impl PageState {
    /// Fallback shape for responses that omit the pagination object: one page
    /// holding everything that was returned.
    pub fn single_page(total_items: u64) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items,
            has_next: false,
            has_prev: false,
        }
    }

    /// Clamp to the invariants the screens rely on: at least one page,
    /// `current_page <= total_pages`, and next/prev flags derived from the
    /// clamped position.
    pub fn normalized(mut self) -> Self {
        self.total_pages = self.total_pages.max(1);
        self.current_page = self.current_page.clamp(1, self.total_pages);
        self.has_next = self.current_page < self.total_pages;
        self.has_prev = self.current_page > 1;
        self
    }
}
