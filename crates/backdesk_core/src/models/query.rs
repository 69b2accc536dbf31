//! Search, filter, and sort state composed into the canonical query key.

use crate::error::ApiError;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Sort direction for the single active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Wire value for the `sortOrder` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Exactly one active sort column at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Column-header click semantics: clicking the active column flips the
    /// direction, clicking a new column selects it ascending.
    pub fn toggle(&mut self, field: &str) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field.to_string();
            self.direction = SortDirection::Asc;
        }
    }
}

/// Fixed-key filter map for one admin screen.
///
/// An empty string means "no constraint"; only non-empty entries are carried
/// into the outgoing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    keys: &'static [&'static str],
    values: BTreeMap<&'static str, String>,
}

impl FilterSet {
    pub fn new(keys: &'static [&'static str]) -> Self {
        Self {
            keys,
            values: BTreeMap::new(),
        }
    }

    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    /// Set one filter value. Unknown keys are rejected before any request is
    /// built.
    ///
    /// # Returns
    /// `true` when the stored value actually changed.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<bool, ApiError> {
        let Some(known) = self.keys.iter().find(|k| **k == key) else {
            return Err(ApiError::Validation(format!(
                "unknown filter key '{}'",
                key
            )));
        };
        let value = value.into();
        let current = self.values.get(known).map(String::as_str).unwrap_or("");
        if current == value {
            return Ok(false);
        }
        if value.is_empty() {
            self.values.remove(known);
        } else {
            self.values.insert(known, value);
        }
        Ok(true)
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Reset every filter to the no-constraint sentinel.
    ///
    /// # Returns
    /// `true` when any filter was actually active.
    pub fn clear(&mut self) -> bool {
        if self.values.is_empty() {
            return false;
        }
        self.values.clear();
        true
    }

    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }

    /// Active (non-empty) entries in deterministic key order.
    pub fn active(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Raw plus settled search input.
///
/// The debounce is poll-based: callers record keystrokes with [`set_input`]
/// and later ask [`settle_due`] whether the window has elapsed. Dropping the
/// state drops the pending commit with it, so no timer can outlive its owner.
///
/// [`set_input`]: SearchState::set_input
/// [`settle_due`]: SearchState::settle_due
#[derive(Debug, Clone)]
pub struct SearchState {
    raw: String,
    debounced: String,
    last_input_at: Option<Instant>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            raw: String::new(),
            debounced: String::new(),
            last_input_at: None,
        }
    }
}

impl SearchState {
    /// Record a keystroke. Each call restarts the debounce window.
    pub fn set_input(&mut self, text: impl Into<String>, now: Instant) {
        self.raw = text.into();
        self.last_input_at = Some(now);
    }

    /// Set the search term programmatically, bypassing the debounce window.
    pub fn set_immediate(&mut self, text: impl Into<String>) {
        self.raw = text.into();
        self.debounced = self.raw.clone();
        self.last_input_at = None;
    }

    /// Immediately reset both raw and settled values, cancelling any pending
    /// commit. Clearing always wins over a scheduled settle.
    ///
    /// # Returns
    /// `true` when the settled value actually changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.debounced.is_empty();
        self.raw.clear();
        self.debounced.clear();
        self.last_input_at = None;
        changed
    }

    /// Commit raw to settled when no new input arrived for `window`.
    ///
    /// # Returns
    /// `true` when the settled value changed as a result.
    pub fn settle_due(&mut self, now: Instant, window: Duration) -> bool {
        let Some(last_input_at) = self.last_input_at else {
            return false;
        };
        if now.saturating_duration_since(last_input_at) < window {
            return false;
        }
        self.last_input_at = None;
        if self.debounced == self.raw {
            return false;
        }
        self.debounced = self.raw.clone();
        true
    }

    /// Time remaining until the pending input settles, if any.
    pub fn due_in(&self, now: Instant, window: Duration) -> Option<Duration> {
        let last_input_at = self.last_input_at?;
        Some(window.saturating_sub(now.saturating_duration_since(last_input_at)))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn debounced(&self) -> &str {
        &self.debounced
    }
}

/// Canonical snapshot of search + filters + sort + page, used as the fetch
/// key. Two descriptors compare equal exactly when their requests would be
/// identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub search: String,
    pub filters: Vec<(String, String)>,
    pub sort_by: String,
    pub sort_order: SortDirection,
    pub page: u32,
    pub limit: u32,
}

impl QueryDescriptor {
    /// Pure derivation from the current screen state. Structurally equal
    /// inputs always yield structurally equal descriptors.
    pub fn compose(
        search: &SearchState,
        filters: &FilterSet,
        sort: &SortSpec,
        page: u32,
        limit: u32,
    ) -> Self {
        Self {
            search: search.debounced().trim().to_string(),
            filters: filters
                .active()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            sort_by: sort.field.clone(),
            sort_order: sort.direction,
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Query-string pairs in the shape the API expects. Empty search is
    /// omitted entirely, matching the no-constraint sentinel rule.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        pairs.push(("sortBy".to_string(), self.sort_by.clone()));
        pairs.push(("sortOrder".to_string(), self.sort_order.as_str().to_string()));
        pairs
    }
}
