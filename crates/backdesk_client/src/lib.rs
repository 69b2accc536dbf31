//! Async API client and per-screen session driver for backdesk.

/// HTTP client and response classification.
pub mod api;
/// Controller-plus-client session for one admin screen.
pub mod session;

pub use api::ApiClient;
pub use session::{DeleteConfirmation, ListSession};
