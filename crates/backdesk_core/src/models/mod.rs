//! Data model for the resource-list screens.

/// Fetch lifecycle and bulk reporting.
pub mod outcome;
/// Pagination summary.
pub mod page;
/// Search, filter, sort, and the canonical query descriptor.
pub mod query;
/// Typed rows per admin screen.
pub mod resource;
/// Row selection for bulk actions.
pub mod selection;
