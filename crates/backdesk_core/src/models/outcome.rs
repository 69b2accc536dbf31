//! Fetch lifecycle and bulk-operation reporting.

use crate::error::ApiError;
use crate::models::page::PageState;
use std::collections::BTreeSet;

/// Resolved result of one list fetch, classified at the network boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// 2xx with items; list and pagination are committed together.
    Success { items: Vec<T>, page: PageState },
    /// 2xx with no items: "no results" affordance, not an error.
    Empty,
    /// Transport failure. Previously rendered data is preserved.
    NetworkError { message: String },
    /// HTTP 401: the session credential is no longer valid.
    AuthRequired,
    /// The server rejected the request; surfaced as a dismissible error.
    ServerError { message: String },
}

impl<T> FetchOutcome<T> {
    /// Classify a fetch result. Decode failures surface as server errors so
    /// the screen shows a dismissible message instead of a blank list.
    pub fn from_result(result: Result<(Vec<T>, PageState), ApiError>) -> Self {
        match result {
            Ok((items, _)) if items.is_empty() => Self::Empty,
            Ok((items, page)) => Self::Success { items, page },
            Err(ApiError::Network(message)) => Self::NetworkError { message },
            Err(ApiError::Auth) => Self::AuthRequired,
            Err(ApiError::Server(message))
            | Err(ApiError::Decode(message))
            | Err(ApiError::Validation(message)) => Self::ServerError { message },
        }
    }
}

/// Rendered status of the current list, kept distinct from the item buffer so
/// loading, empty, and error states never collapse into one blank rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// No fetch issued yet.
    #[default]
    Idle,
    /// A fetch is in flight for the newest descriptor.
    Loading,
    /// Items are rendered and pagination is consistent with them.
    Ready,
    /// The server answered with an empty result set.
    Empty,
    /// Transport failure with nothing rendered to fall back on.
    Unreachable { message: String },
    /// Re-authentication is required before anything else succeeds.
    AuthRequired,
    /// The server rejected the newest fetch.
    Rejected { message: String },
}

/// Report of a batched status update, distinguishing partial success from
/// both total success and total failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOperationResult {
    pub requested: usize,
    pub succeeded: usize,
    pub failed_ids: BTreeSet<String>,
}

impl BulkOperationResult {
    pub fn full_success(requested: usize) -> Self {
        Self {
            requested,
            succeeded: requested,
            failed_ids: BTreeSet::new(),
        }
    }

    pub fn with_failures(
        requested: usize,
        failed_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        let failed_ids: BTreeSet<String> = failed_ids.into_iter().collect();
        Self {
            requested,
            succeeded: requested.saturating_sub(failed_ids.len()),
            failed_ids,
        }
    }

    pub fn is_full_success(&self) -> bool {
        self.failed_ids.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.failed_ids.is_empty() && self.succeeded > 0
    }
}
