//! Message routes.
//!
//! `POST /api/v1/messages` stores a message in a room and
//! `GET /api/v1/rooms/{room_id}/messages` pages through a room's history,
//! oldest first. Validation and the pagination policy live in
//! `chatlog_core`; these handlers only translate between HTTP and it.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chatlog_core::schemas::{CreateMessageRequest, MessageResponse, PageQuery, PaginatedMessages};
use chatlog_core::services::{self, Pagination};
use chatlog_core::{FieldViolation, validation};
use serde_json::Value;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(create_message, list_room_messages),
    components(schemas(
        CreateMessageRequest,
        MessageResponse,
        PaginatedMessages,
        FieldViolation
    ))
)]
pub struct MessagesApi;

/// Register message routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/messages", post(create_message))
        .route("/rooms/{room_id}/messages", get(list_room_messages))
}

#[utoipa::path(
    post,
    path = "/api/v1/messages",
    tag = "messages",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 413, description = "Request body too large"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ServerError> {
    let Json(body) = payload.map_err(|rejection| match rejection {
        JsonRejection::BytesRejection(_) => ServerError::UnreadableBody {
            status: rejection.status(),
            message: rejection.body_text(),
        },
        other => ServerError::Validation(vec![FieldViolation::new("body", other.body_text())]),
    })?;
    let req = validation::parse_create_request(&body)?;
    let stored = services::create_message(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(stored.to_response())))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/messages",
    tag = "messages",
    params(
        ("room_id" = String, Path, description = "Room whose history is requested"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of the room's history", body = PaginatedMessages),
        (status = 404, description = "Room has never had a message"),
        (status = 422, description = "Invalid pagination parameters"),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn list_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PaginatedMessages>, ServerError> {
    let Query(query) = query.map_err(|rejection| ServerError::InvalidParameter(rejection.body_text()))?;
    let page = Pagination::try_from(&query)?;
    let result = services::list_room_messages(state.store.as_ref(), &room_id, page).await?;
    Ok(Json(PaginatedMessages {
        items: result.items.iter().map(|m| m.to_response()).collect(),
        total: result.total,
        limit: result.limit,
        offset: result.offset,
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::trace::X_TRACE_ID;
    use crate::routes;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::json;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    async fn app() -> (Arc<AppState>, Router) {
        let state = AppState::in_memory().await;
        (state.clone(), routes::build(state))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.expect("router is infallible");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::post("/api/v1/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn post_message(app: &Router, room: &str, sender: &str, content: &str) -> Value {
        let (status, body) = send(
            app,
            post_json(json!({ "room_id": room, "sender": sender, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    // ── POST /api/v1/messages ─────────────────────────────────────────────────

    #[tokio::test]
    async fn create_message_success() {
        let (_, app) = app().await;
        let body = post_message(&app, "room-123", "user-1", "Hello, world!").await;

        assert_eq!(body["room_id"], "room-123");
        assert_eq!(body["sender"], "user-1");
        assert_eq!(body["content"], "Hello, world!");
        assert!(body["id"].is_i64());
        let created_at = body["created_at"].as_str().expect("created_at string");
        assert!(created_at.ends_with('Z'), "{created_at}");
    }

    #[tokio::test]
    async fn create_message_empty_content() {
        let (_, app) = app().await;
        let body = post_message(&app, "room-123", "user-1", "").await;
        assert_eq!(body["content"], "");
    }

    #[tokio::test]
    async fn create_message_missing_field() {
        let (_, app) = app().await;
        let (status, body) =
            send(&app, post_json(json!({ "room_id": "room-123", "sender": "user-1" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "content");
    }

    #[tokio::test]
    async fn create_message_invalid_field_type() {
        let (_, app) = app().await;
        let (status, body) = send(
            &app,
            post_json(json!({ "room_id": 123, "sender": "user-1", "content": "Hello, world!" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "room_id");
    }

    #[tokio::test]
    async fn create_message_too_long_sender() {
        let (_, app) = app().await;
        let (status, body) = send(
            &app,
            post_json(json!({ "room_id": "r", "sender": "s".repeat(101), "content": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "sender");
    }

    #[tokio::test]
    async fn create_message_malformed_json() {
        let (_, app) = app().await;
        let req = Request::post("/api/v1/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "body");
    }

    #[tokio::test]
    async fn create_message_reports_every_offending_field() {
        let (_, app) = app().await;
        let (status, body) =
            send(&app, post_json(json!({ "room_id": "", "sender": "s".repeat(101) }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<_> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["room_id", "sender", "content"]);
    }

    #[tokio::test]
    async fn create_message_with_body_above_log_limit() {
        let (_, app) = app().await;
        let body = post_message(&app, "room-big", "user", &"c".repeat(5000)).await;
        assert_eq!(body["content"].as_str().unwrap().chars().count(), 5000);
    }

    #[tokio::test]
    async fn create_message_oversized_body_is_413() {
        let (_, app) = app().await;
        let (status, body) = send(
            &app,
            post_json(json!({ "room_id": "r", "sender": "s", "content": "x".repeat(3 * 1024 * 1024) })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string(), "{body}");
        assert!(body.get("fields").is_none(), "{body}");
    }

    #[tokio::test]
    async fn create_message_storage_failure_hides_details() {
        let (state, app) = app().await;
        state.store.close().await;
        let (status, body) = send(
            &app,
            post_json(json!({ "room_id": "r", "sender": "s", "content": "c" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }

    // ── GET /api/v1/rooms/{room_id}/messages ──────────────────────────────────

    #[tokio::test]
    async fn get_messages_with_pagination() {
        let (_, app) = app().await;
        for i in 0..5 {
            post_message(&app, "room-456", &format!("user-{i}"), &format!("Message {i}")).await;
        }

        let (status, body) = send(&app, get("/api/v1/rooms/room-456/messages?limit=3&offset=0")).await;
        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().expect("items");
        assert_eq!(items.len(), 3);
        assert_eq!(body["total"], 5);
        assert_eq!(body["limit"], 3);
        assert_eq!(body["offset"], 0);
        let contents: Vec<_> = items.iter().map(|m| m["content"].as_str().unwrap()).collect();
        assert_eq!(contents, ["Message 0", "Message 1", "Message 2"]);
    }

    #[tokio::test]
    async fn get_messages_empty_result() {
        let (_, app) = app().await;
        post_message(&app, "room-789", "user-1", "Message 1").await;

        let (status, body) = send(&app, get("/api/v1/rooms/room-789/messages?limit=10&offset=100")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], json!([]));
        assert_eq!(body["total"], 1);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["offset"], 100);
    }

    #[tokio::test]
    async fn get_messages_nonexistent_room() {
        let (_, app) = app().await;
        let (status, body) = send(&app, get("/api/v1/rooms/nonexistent-room/messages")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().to_lowercase().contains("not found"));
    }

    #[tokio::test]
    async fn get_messages_nonexistent_room_past_first_page() {
        let (_, app) = app().await;
        let (status, body) = send(&app, get("/api/v1/rooms/nonexistent-room/messages?offset=20")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], json!([]));
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn get_messages_default_pagination() {
        let (_, app) = app().await;
        post_message(&app, "room-default", "user-1", "Test message").await;

        let (status, body) = send(&app, get("/api/v1/rooms/room-default/messages")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["limit"], 20);
        assert_eq!(body["offset"], 0);
    }

    #[tokio::test]
    async fn get_messages_walks_every_page_once() {
        let (_, app) = app().await;
        let mut created = Vec::new();
        for i in 0..7 {
            created.push(post_message(&app, "room-walk", "user", &format!("m{i}")).await["id"].clone());
        }

        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let uri = format!("/api/v1/rooms/room-walk/messages?limit=3&offset={offset}");
            let (status, body) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["total"], 7);
            let items = body["items"].as_array().unwrap().clone();
            if items.is_empty() {
                break;
            }
            offset += items.len();
            seen.extend(items.into_iter().map(|m| m["id"].clone()));
        }
        assert_eq!(seen, created);
    }

    #[tokio::test]
    async fn get_messages_is_scoped_to_room() {
        let (_, app) = app().await;
        post_message(&app, "room-a", "user", "for a").await;
        post_message(&app, "room-b", "user", "for b").await;

        let (_, body) = send(&app, get("/api/v1/rooms/room-a/messages")).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["content"], "for a");
    }

    #[tokio::test]
    async fn get_messages_rejects_bad_parameters() {
        let (_, app) = app().await;
        post_message(&app, "room-params", "user", "hi").await;

        for query in ["limit=0", "limit=101", "offset=-1", "limit=abc", "offset=1.5"] {
            let uri = format!("/api/v1/rooms/room-params/messages?{query}");
            let (status, body) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{query}: {body}");
            assert!(body["error"].is_string(), "{query}: {body}");
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn get_messages_storage_failure_is_500() {
        let (state, app) = app().await;
        state.store.close().await;
        let (status, body) = send(&app, get("/api/v1/rooms/any/messages")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
        assert!(logs_contain("storage error"));
        assert!(logs_contain("count_messages"));
    }

    #[tokio::test]
    async fn trace_id_is_echoed() {
        let (_, app) = app().await;
        let trace_id = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";
        let req = Request::get("/api/v1/rooms/nonexistent-room/messages")
            .header(X_TRACE_ID, trace_id)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[X_TRACE_ID], trace_id);
    }
}
