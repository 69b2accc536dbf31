//! Core domain library for backdesk (config, list controller, models).

/// Configuration loading and defaults.
pub mod config;
/// The per-screen resource list controller.
pub mod controller;
/// Response-envelope normalization.
pub mod envelope;
/// Classified error types.
pub mod error;
/// Data models for queries, pagination, rows, and outcomes.
pub mod models;

pub use config::Config;
pub use controller::{ListController, PendingFetch};
pub use envelope::{decode_ack_body, decode_bulk_body, decode_list_body, ListPayload};
pub use error::ApiError;
pub use models::outcome::{BulkOperationResult, FetchOutcome, FetchPhase};
pub use models::page::PageState;
pub use models::query::{FilterSet, QueryDescriptor, SearchState, SortDirection, SortSpec};
pub use models::resource::Resource;
pub use models::selection::SelectionSet;
