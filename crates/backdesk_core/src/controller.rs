//! The resource list controller.
//!
//! One controller instance backs one admin screen. It owns the search,
//! filter, sort, page, selection, and fetch-lifecycle state, and exposes a
//! poll-based protocol to whatever drives it: call [`ListController::poll_due_fetch`]
//! on every tick, perform the returned request, then hand the classified
//! result back through [`ListController::commit`]. Commits carry the sequence
//! number of the fetch they answer; anything older than the newest issued
//! fetch is discarded, so late responses can never overwrite newer state.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::outcome::{BulkOperationResult, FetchOutcome, FetchPhase};
use crate::models::page::PageState;
use crate::models::query::{FilterSet, QueryDescriptor, SearchState, SortSpec};
use crate::models::resource::Resource;
use crate::models::selection::SelectionSet;
use std::time::{Duration, Instant};
use tracing::debug;

/// A fetch the controller wants performed, keyed by sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub seq: u64,
    pub descriptor: QueryDescriptor,
}

/// State machine behind one resource-list screen.
pub struct ListController<R: Resource> {
    search: SearchState,
    filters: FilterSet,
    sort: SortSpec,
    requested_page: u32,
    page_size: u32,
    debounce_window: Duration,
    items: Vec<R>,
    page: PageState,
    phase: FetchPhase,
    selection: SelectionSet,
    last_sent: Option<QueryDescriptor>,
    issued_seq: u64,
    last_network_error: Option<String>,
}

impl<R: Resource> ListController<R> {
    pub fn new(page_size: u32, debounce_window: Duration) -> Self {
        Self {
            search: SearchState::default(),
            filters: FilterSet::new(R::FILTER_KEYS),
            sort: R::default_sort(),
            requested_page: 1,
            page_size: page_size.max(1),
            debounce_window,
            items: Vec::new(),
            page: PageState::default(),
            phase: FetchPhase::Idle,
            selection: SelectionSet::default(),
            last_sent: None,
            issued_seq: 0,
            last_network_error: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.page_size, config.debounce_window())
    }

    // ---- input ----------------------------------------------------------

    /// Record a keystroke in the search box. The query only changes once the
    /// input settles for the debounce window.
    pub fn set_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search.set_input(text, now);
    }

    /// Set the search term programmatically (no keystroke latency to absorb).
    pub fn set_search_immediate(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.trim() != self.search.debounced() {
            self.requested_page = 1;
        }
        self.search.set_immediate(text);
    }

    /// Clear the search box immediately, cancelling any pending settle.
    pub fn clear_search(&mut self) {
        if self.search.clear() {
            self.requested_page = 1;
        }
    }

    /// Set one filter value. Any actual change rewinds to page 1.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) -> Result<(), ApiError> {
        if self.filters.set(key, value)? {
            self.requested_page = 1;
        }
        Ok(())
    }

    /// Reset every filter. Idempotent: a second clear changes nothing and
    /// triggers no refetch.
    pub fn clear_filters(&mut self) {
        if self.filters.clear() {
            self.requested_page = 1;
        }
    }

    /// Column-header click: toggle direction on the active column, select a
    /// new column ascending. Always rewinds to page 1.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort.toggle(field);
        self.requested_page = 1;
    }

    /// Replace the sort outright (programmatic callers). Any actual change
    /// rewinds to page 1.
    pub fn set_sort(&mut self, sort: SortSpec) {
        if self.sort != sort {
            self.sort = sort;
            self.requested_page = 1;
        }
    }

    /// Request a specific page. Clamped to the known page count once a result
    /// has been committed.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        self.requested_page = match self.phase {
            FetchPhase::Ready => page.min(self.page.total_pages.max(1)),
            _ => page,
        };
    }

    // ---- fetch lifecycle -------------------------------------------------

    /// Ask whether a fetch is due. Settles the debounce first, composes the
    /// canonical descriptor, and dedupes against the last issued one, so a
    /// burst of keystrokes or an idempotent "clear filters" yields at most
    /// one request.
    pub fn poll_due_fetch(&mut self, now: Instant) -> Option<PendingFetch> {
        if self.search.settle_due(now, self.debounce_window) {
            self.requested_page = 1;
        }

        let descriptor = QueryDescriptor::compose(
            &self.search,
            &self.filters,
            &self.sort,
            self.requested_page,
            self.page_size,
        );
        if self.last_sent.as_ref() == Some(&descriptor) {
            return None;
        }

        self.issued_seq += 1;
        self.last_sent = Some(descriptor.clone());
        self.phase = FetchPhase::Loading;
        debug!(
            resource = R::BASE_PATH,
            seq = self.issued_seq,
            page = descriptor.page,
            search = %descriptor.search,
            "issuing list fetch"
        );
        Some(PendingFetch {
            seq: self.issued_seq,
            descriptor,
        })
    }

    /// Time until the pending search input settles, if any. Drivers sleep for
    /// this long instead of busy-polling.
    pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
        self.search.due_in(now, self.debounce_window)
    }

    /// Forget the last issued descriptor so the next poll refetches the
    /// current query even though nothing changed.
    pub fn force_refresh(&mut self) {
        self.last_sent = None;
    }

    /// Commit the classified result of fetch `seq`.
    ///
    /// Responses for anything but the newest issued fetch are discarded: by
    /// the time they arrive the user has already changed the query, and
    /// committing them would flicker the screen back to stale results.
    ///
    /// # Returns
    /// `true` when the result was committed, `false` when it was stale.
    pub fn commit(&mut self, seq: u64, outcome: FetchOutcome<R>) -> bool {
        if seq != self.issued_seq {
            debug!(
                resource = R::BASE_PATH,
                seq,
                newest = self.issued_seq,
                "dropping stale list response"
            );
            return false;
        }

        match outcome {
            FetchOutcome::Success { items, page } => {
                let page = page.normalized();
                // Sync to the server's page only when no newer page click
                // arrived while this fetch was in flight; that click still
                // owes the user a fetch.
                if self.last_sent.as_ref().map(|d| d.page) == Some(self.requested_page) {
                    self.requested_page = page.current_page;
                }
                // Items and pagination move together; no render can observe
                // one without the other.
                self.items = items;
                self.page = page;
                self.selection.clear();
                self.phase = FetchPhase::Ready;
                self.last_network_error = None;
            }
            FetchOutcome::Empty => {
                self.items.clear();
                self.page = PageState::single_page(0);
                if self.last_sent.as_ref().map(|d| d.page) == Some(self.requested_page) {
                    self.requested_page = 1;
                }
                self.selection.clear();
                self.phase = FetchPhase::Empty;
                self.last_network_error = None;
            }
            FetchOutcome::NetworkError { message } => {
                // Transient: keep whatever is rendered and stay interactive.
                self.last_network_error = Some(message.clone());
                if self.items.is_empty() {
                    self.phase = FetchPhase::Unreachable { message };
                } else {
                    self.phase = FetchPhase::Ready;
                }
            }
            FetchOutcome::AuthRequired => {
                self.phase = FetchPhase::AuthRequired;
            }
            FetchOutcome::ServerError { message } => {
                // Dismissible; the current list and query state survive.
                self.phase = FetchPhase::Rejected { message };
            }
        }
        true
    }

    // ---- selection and bulk ----------------------------------------------

    /// Flip selection of a rendered row. IDs not on the current page are
    /// ignored.
    pub fn toggle_select(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|item| item.id() == id) {
            return false;
        }
        self.selection.toggle(id);
        true
    }

    /// Select every row on the current page.
    pub fn select_all(&mut self) {
        self.selection.clear();
        for item in &self.items {
            self.selection.insert(item.id());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Snapshot the selected IDs for a bulk request.
    ///
    /// # Errors
    /// `Validation` when nothing is selected; no request should be issued.
    pub fn begin_bulk(&self) -> Result<Vec<String>, ApiError> {
        if self.selection.is_empty() {
            return Err(ApiError::Validation(format!(
                "no {} rows selected",
                R::DISPLAY_NAME
            )));
        }
        Ok(self.selection.ids())
    }

    /// Reconcile the selection with a bulk report: exactly the failed IDs
    /// stay selected so the user can retry or inspect them.
    pub fn apply_bulk_result(&mut self, result: &BulkOperationResult) {
        self.selection
            .retain(|id| result.failed_ids.contains(id));
    }

    // ---- accessors -------------------------------------------------------

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn phase(&self) -> &FetchPhase {
        &self.phase
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn search_raw(&self) -> &str {
        self.search.raw()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Most recent transport failure, kept for diagnostics; it never blocks
    /// the screen.
    pub fn last_network_error(&self) -> Option<&str> {
        self.last_network_error.as_deref()
    }
}
