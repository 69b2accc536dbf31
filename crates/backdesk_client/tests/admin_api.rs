//! End-to-end tests for the client against an in-process mock API.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use backdesk_client::{ApiClient, DeleteConfirmation, ListSession};
use backdesk_core::models::resource::MediaArticle;
use backdesk_core::{ApiError, FetchPhase, ListController};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock api");
    });
    format!("http://{}", addr)
}

fn session(base: &str, timeout: Duration) -> ListSession<MediaArticle> {
    let client = ApiClient::with_options(base, Some("test-token".to_string()), timeout)
        .expect("api client");
    let controller = ListController::new(10, Duration::from_millis(10));
    ListSession::new(client, controller)
}

fn row_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Article {}", id),
        "category": "press",
        "status": status,
        "publishedAt": null,
        "createdAt": "2025-06-01T10:00:00Z",
    })
}

fn pagination_json(current: u32, total_pages: u32, total_items: u64) -> Value {
    json!({
        "currentPage": current,
        "totalPages": total_pages,
        "totalItems": total_items,
        "hasNext": current < total_pages,
        "hasPrev": current > 1,
    })
}

#[tokio::test]
async fn list_commits_flat_envelope() {
    let router = Router::new().route(
        "/media",
        get(|| async {
            Json(json!({
                "success": true,
                "data": {
                    "items": [row_json("m1", "published"), row_json("m2", "draft")],
                    "pagination": pagination_json(1, 3, 24),
                }
            }))
        }),
    );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    assert!(session.pump().await);
    let ctl = session.controller();
    assert_eq!(ctl.items().len(), 2);
    assert_eq!(ctl.items()[0].id, "m1");
    assert_eq!(ctl.page().total_items, 24);
    assert_eq!(*ctl.phase(), FetchPhase::Ready);
}

#[tokio::test]
async fn list_normalizes_nested_envelope() {
    let router = Router::new().route(
        "/media",
        get(|| async {
            Json(json!({
                "success": true,
                "data": {
                    "data": {
                        "items": [row_json("m9", "published")],
                        "pagination": pagination_json(1, 1, 1),
                    }
                }
            }))
        }),
    );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    assert_eq!(session.controller().items()[0].id, "m9");
    assert_eq!(*session.controller().phase(), FetchPhase::Ready);
}

#[tokio::test]
async fn list_sends_canonical_query_parameters() {
    type Captured = Arc<Mutex<Option<HashMap<String, String>>>>;
    let captured: Captured = Arc::new(Mutex::new(None));

    let router = Router::new()
        .route(
            "/media",
            get(
                |State(captured): State<Captured>,
                 headers: HeaderMap,
                 Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(
                        headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default(),
                        "Bearer test-token"
                    );
                    *captured.lock().unwrap() = Some(params);
                    Json(json!({
                        "success": true,
                        "data": { "items": [row_json("m1", "published")] }
                    }))
                },
            ),
        )
        .with_state(captured.clone());
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.controller_mut().set_search_immediate("covid");
    session
        .controller_mut()
        .set_filter("status", "published")
        .unwrap();
    session.pump().await;

    let params = captured.lock().unwrap().clone().expect("captured params");
    assert_eq!(params.get("page").map(String::as_str), Some("1"));
    assert_eq!(params.get("limit").map(String::as_str), Some("10"));
    assert_eq!(params.get("search").map(String::as_str), Some("covid"));
    assert_eq!(params.get("status").map(String::as_str), Some("published"));
    assert_eq!(params.get("sortBy").map(String::as_str), Some("createdAt"));
    assert_eq!(params.get("sortOrder").map(String::as_str), Some("DESC"));
}

#[tokio::test]
async fn empty_result_renders_as_empty_not_error() {
    let router = Router::new().route(
        "/media",
        get(|| async {
            Json(json!({
                "success": true,
                "data": { "items": [], "pagination": pagination_json(1, 1, 0) }
            }))
        }),
    );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    assert_eq!(*session.controller().phase(), FetchPhase::Empty);
    assert!(session.controller().items().is_empty());
}

#[tokio::test]
async fn unauthorized_fetch_prompts_reauth_exactly_once() {
    let router = Router::new().route(
        "/media",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "success": false }))) }),
    );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    assert_eq!(*session.controller().phase(), FetchPhase::AuthRequired);
    assert!(session.take_reauth_prompt());
    assert!(!session.take_reauth_prompt());
}

#[tokio::test]
async fn server_rejection_preserves_message() {
    let router = Router::new().route(
        "/media",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "database offline" })),
            )
        }),
    );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    match session.controller().phase() {
        FetchPhase::Rejected { message } => assert_eq!(message, "database offline"),
        other => panic!("unexpected phase: {:?}", other),
    }
}

#[tokio::test]
async fn timeout_keeps_rendered_items_interactive() {
    // Page 1 is on screen; page 2 times out.
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/media",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                if calls.fetch_add(1, Ordering::SeqCst) > 0 {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
                Json(json!({
                    "success": true,
                    "data": {
                        "items": [row_json("m1", "published"), row_json("m2", "draft")],
                        "pagination": pagination_json(1, 3, 21),
                    }
                }))
            }),
        )
        .with_state(calls.clone());
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_millis(250));

    session.pump().await;
    assert_eq!(session.controller().items().len(), 2);

    session.controller_mut().set_page(2);
    session.pump().await;

    let ctl = session.controller();
    assert_eq!(ctl.items().len(), 2, "rendered items survive the timeout");
    assert_eq!(*ctl.phase(), FetchPhase::Ready, "no blocking error state");
    assert!(ctl.last_network_error().is_some());
}

fn bulk_fixture_router(bulk_response: Value, bulk_status: StatusCode) -> Router {
    let list_calls = Arc::new(AtomicUsize::new(0));
    Router::new()
        .route(
            "/media",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "success": true,
                    "data": {
                        "items": [
                            row_json("a", "draft"),
                            row_json("b", "draft"),
                            row_json("c", "draft"),
                        ],
                        "pagination": pagination_json(1, 1, 3),
                    }
                }))
            }),
        )
        .with_state(list_calls)
        .route(
            "/media/bulk-update",
            patch(move || async move { (bulk_status, Json(bulk_response)) }),
        )
}

#[tokio::test]
async fn bulk_partial_failure_keeps_failed_ids_selected() {
    let router = bulk_fixture_router(
        json!({ "success": false, "data": { "failedIds": ["b"] } }),
        StatusCode::OK,
    );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    session.controller_mut().select_all();

    let report = session
        .apply_bulk_status("archived")
        .await
        .expect("partial report");
    assert_eq!(report.requested, 3);
    assert_eq!(report.succeeded, 2);
    assert!(report.is_partial());

    assert_eq!(session.controller().selection().ids(), vec!["b"]);
    for id in ["a", "b", "c"] {
        assert!(!session.is_row_busy(id), "row {} still marked busy", id);
    }
}

#[tokio::test]
async fn bulk_full_success_clears_selection_and_refetches() {
    let router = bulk_fixture_router(json!({ "success": true }), StatusCode::OK);
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    session.controller_mut().select_all();

    let report = session.apply_bulk_status("archived").await.expect("report");
    assert!(report.is_full_success());
    assert!(session.controller().selection().is_empty());
    // The refetch recommitted the list.
    assert_eq!(*session.controller().phase(), FetchPhase::Ready);
}

#[tokio::test]
async fn bulk_unauthorized_marks_nothing_archived() {
    // Five selected rows; the server answers 401.
    let router = Router::new()
        .route(
            "/media",
            get(|| async {
                let items: Vec<Value> = ["a", "b", "c", "d", "e"]
                    .iter()
                    .map(|id| row_json(id, "draft"))
                    .collect();
                Json(json!({
                    "success": true,
                    "data": { "items": items, "pagination": pagination_json(1, 1, 5) }
                }))
            }),
        )
        .route(
            "/media/bulk-update",
            patch(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "success": false }))) }),
        );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    session.controller_mut().select_all();

    let err = session.apply_bulk_status("archived").await.unwrap_err();
    assert_eq!(err, ApiError::Auth);
    assert!(session.take_reauth_prompt());

    let ctl = session.controller();
    assert_eq!(ctl.selection().len(), 5, "selection survives for retry");
    assert!(ctl.items().iter().all(|row| row.status == "draft"));
}

#[tokio::test]
async fn empty_selection_bulk_never_reaches_the_network() {
    // Unroutable base: any dispatched request would fail as a network error.
    let mut session = session("http://127.0.0.1:9", Duration::from_millis(200));
    let err = session.apply_bulk_status("archived").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn delete_refetches_after_success() {
    let list_calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/media",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "success": true,
                    "data": { "items": [row_json("m1", "draft")] }
                }))
            }),
        )
        .with_state(list_calls.clone())
        .route(
            "/media/:id",
            delete(|Path(id): Path<String>| async move {
                assert_eq!(id, "m1");
                Json(json!({ "success": true }))
            }),
        );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    session
        .delete("m1", DeleteConfirmation::Confirmed)
        .await
        .expect("delete");

    assert_eq!(list_calls.load(Ordering::SeqCst), 2);
    assert!(!session.is_row_busy("m1"));
}

#[tokio::test]
async fn delete_failure_leaves_row_unchanged() {
    let router = Router::new()
        .route(
            "/media",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": { "items": [row_json("m1", "published")] }
                }))
            }),
        )
        .route(
            "/media/:id",
            delete(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "success": false, "message": "article is referenced" })),
                )
            }),
        );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    let err = session
        .delete("m1", DeleteConfirmation::Confirmed)
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Server("article is referenced".to_string()));

    let ctl = session.controller();
    assert_eq!(ctl.items()[0].id, "m1");
    assert_eq!(ctl.items()[0].status, "published");
    assert!(!session.is_row_busy("m1"));
}

#[tokio::test]
async fn single_status_update_refetches_on_success() {
    let router = Router::new()
        .route(
            "/media",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": { "items": [row_json("m1", "draft")] }
                }))
            }),
        )
        .route(
            "/media/:id/status",
            patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                assert_eq!(id, "m1");
                assert_eq!(body["status"], "published");
                Json(json!({ "success": true }))
            }),
        );
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    session
        .set_status("m1", "published", None)
        .await
        .expect("status update");
    assert_eq!(*session.controller().phase(), FetchPhase::Ready);
}

#[tokio::test]
async fn debounced_search_settles_into_one_request() {
    let list_calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/media",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "success": true,
                    "data": { "items": [row_json("m1", "published")] }
                }))
            }),
        )
        .with_state(list_calls.clone());
    let base = spawn(router).await;
    let mut session = session(&base, Duration::from_secs(5));

    session.pump().await;
    assert_eq!(list_calls.load(Ordering::SeqCst), 1);

    let now = std::time::Instant::now();
    session.controller_mut().set_search_input("c", now);
    session.controller_mut().set_search_input("co", now);
    session.controller_mut().set_search_input("cov", now);
    session.run_until_idle().await;

    // One initial fetch plus exactly one settled search fetch.
    assert_eq!(list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(session.controller().search_raw(), "cov");
}
