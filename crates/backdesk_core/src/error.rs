//! Classified error types for back-office API interactions.
use thiserror::Error;

/// Top-level error for list fetches and mutations.
///
/// The variants follow the propagation policy the admin screens rely on:
/// `Network` is transient and must never discard rendered data, `Auth` is the
/// only class allowed to navigate the user away, and `Server` is surfaced as a
/// dismissible notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure: connection refused, timeout, DNS.
    #[error("Network error: {0}")]
    Network(String),

    /// The bearer credential was rejected (HTTP 401).
    #[error("Authentication required")]
    Auth,

    /// The server rejected the request (4xx/5xx or `success: false` body).
    #[error("Server error: {0}")]
    Server(String),

    /// The response body did not match any known envelope shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// A client-side precondition failed before any request was issued.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Whether the failure is transient and safe to retry without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the failure invalidates the current session credential.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Auth)
    }
}
