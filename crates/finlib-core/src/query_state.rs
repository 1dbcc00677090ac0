//! Two-way binding between a view's [`FilterState`] and its shareable link.
//!
//! The manager owns both halves and rewrites them together on every
//! mutation, so a caller can never observe a state whose link disagrees with
//! it.

use crate::filter::{FilterKey, FilterState, Page};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStateManager {
    state: FilterState,
    link: String,
}

impl QueryStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a view from a shareable representation. Malformed input is
    /// corrected to defaults, and the stored link is the canonical form.
    pub fn from_shareable(input: &str) -> Self {
        let mut manager = Self::new();
        manager.commit(FilterState::from_query_string(input));
        manager
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Canonical query string, without a leading `?`. Empty when no field
    /// differs from its default.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Updates one filter and returns to page 1.
    pub fn set_filter(&mut self, key: FilterKey, value: &str) -> &FilterState {
        let next = self.state.with_filter(key, value);
        self.commit(next)
    }

    /// Navigates to `page`, keeping every filter.
    pub fn set_page(&mut self, page: Page) -> &FilterState {
        let next = self.state.with_page(page);
        self.commit(next)
    }

    /// Moves one page forward.
    pub fn next_page(&mut self) -> &FilterState {
        self.set_page(self.state.page.next())
    }

    /// Moves one page back; stays put on page 1.
    pub fn prev_page(&mut self) -> &FilterState {
        match self.state.page.prev() {
            Some(page) => self.set_page(page),
            None => &self.state,
        }
    }

    /// Drops every filter and the whole link.
    pub fn clear(&mut self) -> &FilterState {
        self.commit(FilterState::default())
    }

    fn commit(&mut self, next: FilterState) -> &FilterState {
        self.link = next.to_query_string();
        self.state = next;
        &self.state
    }
}
