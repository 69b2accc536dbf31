//! Response-envelope normalization.
//!
//! The API answers list requests in more than one shape: flat
//! `{ success, data: { items, pagination } }`, nested
//! `{ success, data: { data: { items, pagination } } }`, and bare arrays from
//! older endpoints. Everything is normalized here, at one boundary, into
//! [`ListPayload`]; call sites never probe the raw JSON themselves.

use crate::error::ApiError;
use crate::models::outcome::BulkOperationResult;
use crate::models::page::PageState;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Canonical list-fetch payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPayload<T> {
    pub items: Vec<T>,
    pub page: PageState,
}

/// Extract the server-supplied failure message, probing the fields the API
/// has been observed to use.
pub fn message_from_body(body: &Value) -> Option<String> {
    for key in ["message", "error"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            let trimmed = message.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn rejection(body: &Value) -> ApiError {
    ApiError::Server(message_from_body(body).unwrap_or_else(|| "Request failed".to_string()))
}

fn explicit_failure(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}

/// Locate the object that carries `items` (and usually `pagination`).
fn items_container(body: &Value) -> Option<&Value> {
    let data = body.get("data")?;
    if data.get("data").and_then(|inner| inner.get("items")).is_some() {
        return data.get("data");
    }
    if data.get("items").is_some() || data.is_array() {
        return Some(data);
    }
    None
}

fn decode_items<T: DeserializeOwned>(raw: &Value) -> Result<Vec<T>, ApiError> {
    serde_json::from_value(raw.clone())
        .map_err(|err| ApiError::Decode(format!("list items: {}", err)))
}

/// Decode any observed list envelope into the canonical payload.
///
/// A missing or malformed pagination object is not an error: the payload
/// falls back to a single page holding the returned items.
pub fn decode_list_body<T: DeserializeOwned>(body: &Value) -> Result<ListPayload<T>, ApiError> {
    if explicit_failure(body) {
        return Err(rejection(body));
    }

    let (items_raw, pagination_raw) = if let Some(container) = items_container(body) {
        if container.is_array() {
            (container, None)
        } else {
            (
                container
                    .get("items")
                    .ok_or_else(|| ApiError::Decode("missing items array".to_string()))?,
                container.get("pagination"),
            )
        }
    } else if let Some(items) = body.get("items") {
        (items, body.get("pagination"))
    } else if body.is_array() {
        (body, None)
    } else {
        return Err(ApiError::Decode(
            "response carries no recognizable item list".to_string(),
        ));
    };

    let items: Vec<T> = decode_items(items_raw)?;
    let page = pagination_raw
        .and_then(|raw| serde_json::from_value::<PageState>(raw.clone()).ok())
        .unwrap_or_else(|| PageState::single_page(items.len() as u64))
        .normalized();

    Ok(ListPayload { items, page })
}

/// Decode a mutation acknowledgment (`delete`, single status update).
pub fn decode_ack_body(body: &Value) -> Result<(), ApiError> {
    if explicit_failure(body) {
        return Err(rejection(body));
    }
    Ok(())
}

/// Decode a bulk-update acknowledgment into a [`BulkOperationResult`].
///
/// The server reports per-item failures under `failedIds` (either at the top
/// level or under `data`); their presence makes the result partial even when
/// `success` is false.
pub fn decode_bulk_body(
    requested_ids: &[String],
    body: &Value,
) -> Result<BulkOperationResult, ApiError> {
    let failed_raw = body
        .get("failedIds")
        .or_else(|| body.get("data").and_then(|data| data.get("failedIds")));

    if let Some(raw) = failed_raw {
        let failed: Vec<String> = serde_json::from_value(raw.clone())
            .map_err(|err| ApiError::Decode(format!("failedIds: {}", err)))?;
        if !failed.is_empty() {
            return Ok(BulkOperationResult::with_failures(
                requested_ids.len(),
                failed,
            ));
        }
    }

    if explicit_failure(body) {
        return Err(rejection(body));
    }
    Ok(BulkOperationResult::full_success(requested_ids.len()))
}
