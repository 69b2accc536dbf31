//! HTTP client for the back-office REST API.
//!
//! All transport and status classification happens here: call sites receive
//! an [`ApiError`] already sorted into the taxonomy the screens act on
//! (network / auth / server / decode), and list bodies arrive as the
//! canonical [`ListPayload`] regardless of which envelope shape the server
//! used.

use backdesk_core::envelope::{
    decode_ack_body, decode_bulk_body, decode_list_body, message_from_body, ListPayload,
};
use backdesk_core::{ApiError, BulkOperationResult, Config, QueryDescriptor, Resource};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Thin reqwest wrapper carrying the base URL and bearer credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: reqwest::Url,
    token: Option<String>,
}

/// Strip trailing slashes so segment joining stays predictable.
fn normalize_server(server: &str) -> String {
    let mut normalized = server.trim().to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = message_from_body(&value) {
            return message;
        }
    }
    body.trim().to_string()
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

impl ApiClient {
    /// Build a client from runtime configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_options(&config.server_url, config.token.clone(), config.timeout())
    }

    /// Build a client with explicit options (used by tests to shorten the
    /// timeout well below the production default).
    pub fn with_options(
        server: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base = reqwest::Url::parse(&normalize_server(server))
            .map_err(|err| ApiError::Validation(format!("invalid server URL '{}': {}", server, err)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Validation(format!("HTTP client setup failed: {}", err)))?;
        Ok(Self { http, base, token })
    }

    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Validation("server URL cannot be an API base".to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Classify the response status, then parse the JSON body.
    async fn classified_body(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Auth);
        }
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => format!("failed to read error response body: {}", err),
            };
            return Err(ApiError::Server(error_message_for_response(status, &body)));
        }
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(format!("response body: {}", err)))
    }

    /// Fetch one page of a resource list for the given descriptor.
    pub async fn fetch_list<R: Resource>(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ListPayload<R>, ApiError> {
        let url = self.url(&[R::BASE_PATH])?;
        debug!(resource = R::BASE_PATH, page = descriptor.page, "GET list");
        let response = self
            .authorized(self.http.get(url).query(&descriptor.query_pairs()))
            .send()
            .await
            .map_err(transport_error)?;
        let body = Self::classified_body(response).await?;
        decode_list_body(&body)
    }

    /// `PATCH <resource>/bulk-update` over the selected IDs.
    pub async fn bulk_update_status(
        &self,
        base_path: &str,
        ids: &[String],
        status: &str,
    ) -> Result<BulkOperationResult, ApiError> {
        if ids.is_empty() {
            return Err(ApiError::Validation("bulk update with no IDs".to_string()));
        }
        let url = self.url(&[base_path, "bulk-update"])?;
        debug!(resource = base_path, count = ids.len(), status, "PATCH bulk-update");
        let response = self
            .authorized(self.http.patch(url).json(&json!({
                "ids": ids,
                "status": status,
            })))
            .send()
            .await
            .map_err(transport_error)?;
        let body = Self::classified_body(response).await?;
        decode_bulk_body(ids, &body)
    }

    /// `DELETE <resource>/<id>`.
    pub async fn delete_one(&self, base_path: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url(&[base_path, id])?;
        debug!(resource = base_path, id, "DELETE");
        let response = self
            .authorized(self.http.delete(url))
            .send()
            .await
            .map_err(transport_error)?;
        let body = Self::classified_body(response).await?;
        decode_ack_body(&body)
    }

    /// `PATCH <resource>/<id>/status`.
    pub async fn update_status(
        &self,
        base_path: &str,
        id: &str,
        status: &str,
        note: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.url(&[base_path, id, "status"])?;
        debug!(resource = base_path, id, status, "PATCH status");
        let mut payload = json!({ "status": status });
        if let Some(note) = note {
            payload["note"] = note.into();
        }
        let response = self
            .authorized(self.http.patch(url).json(&payload))
            .send()
            .await
            .map_err(transport_error)?;
        let body = Self::classified_body(response).await?;
        decode_ack_body(&body)
    }
}
