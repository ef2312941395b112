//! HTTP handlers for the cache

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::partition::Partitioner;
use crate::store::{CacheStore, StoreError};

/// Header carrying the partition index of the addressed key
pub const SHARD_HEADER: HeaderName = HeaderName::from_static("x-shard");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CacheStore>,
    pub partitioner: Partitioner,
}

impl AppState {
    pub fn new(store: Arc<dyn CacheStore>, partitioner: Partitioner) -> Self {
        AppState { store, partitioner }
    }

    fn shard_header(&self, key: &str) -> [(HeaderName, String); 1] {
        let shard = self.partitioner.partition(key.as_bytes());
        [(SHARD_HEADER, shard.to_string())]
    }
}

/// Response for a delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Whether the key existed
    pub removed: bool,
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a store error to an HTTP status
fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::CapacityExceeded(_) => StatusCode::CONFLICT,
        StoreError::EmptyKey | StoreError::KeyTooLong(_) | StoreError::ValueTooLong(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

/// Get a key
pub async fn get_key(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    lookup(&state, &key)
}

/// `GET /` addresses the empty key
pub async fn get_root(State(state): State<AppState>) -> Response {
    lookup(&state, "")
}

fn lookup(state: &AppState, key: &str) -> Response {
    debug!("GET {:?}", key);

    match state.store.get(key.as_bytes()) {
        Ok(value) => {
            let mut body = Map::new();
            body.insert(
                key.to_string(),
                Value::String(String::from_utf8_lossy(&value).into_owned()),
            );
            (StatusCode::OK, state.shard_header(key), Json(Value::Object(body))).into_response()
        }
        Err(StoreError::NotFound) => (StatusCode::NOT_FOUND, state.shard_header(key)).into_response(),
        Err(e) => {
            warn!("Rejected GET: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

/// Set a key from a `{"key": "value"}` body
///
/// The request path is ignored; the key comes from the body.
pub async fn set_key(State(state): State<AppState>, body: Bytes) -> Response {
    let (key, value) = match parse_pair(&body) {
        Ok(pair) => pair,
        Err(message) => {
            warn!("Rejected SET: {}", message);
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    debug!("SET {:?} ({} bytes)", key, value.len());

    let headers = state.shard_header(&key);
    match state.store.set(Bytes::from(key), Bytes::from(value)) {
        Ok(_) => (StatusCode::OK, headers).into_response(),
        Err(e) => {
            warn!("Rejected SET: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

/// Extract exactly one string-valued field from a JSON object
fn parse_pair(body: &[u8]) -> Result<(String, String), String> {
    let object: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| format!("Malformed JSON body: {}", e))?;

    if object.len() != 1 {
        return Err(format!(
            "Expected exactly one key/value pair, got {}",
            object.len()
        ));
    }

    match object.into_iter().next() {
        Some((key, Value::String(value))) => Ok((key, value)),
        Some((key, _)) => Err(format!("Value for {:?} must be a string", key)),
        None => Err("Expected exactly one key/value pair, got 0".to_string()),
    }
}

/// Delete a key
pub async fn delete_key(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    remove(&state, &key)
}

/// `DELETE /` addresses the empty key
pub async fn delete_root(State(state): State<AppState>) -> Response {
    remove(&state, "")
}

fn remove(state: &AppState, key: &str) -> Response {
    debug!("DELETE {:?}", key);

    match state.store.delete(key.as_bytes()) {
        Ok(removed) => (
            StatusCode::OK,
            state.shard_header(key),
            Json(DeleteResponse { removed }),
        )
            .into_response(),
        Err(e) => {
            warn!("Rejected DELETE: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MAX_KEY_LEN};
    use crate::web::router;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::Router;
    use tower::ServiceExt;

    fn app_with_capacity(capacity: usize) -> Router {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::with_capacity(capacity));
        router(AppState::new(store, Partitioner::default()))
    }

    fn app() -> Router {
        app_with_capacity(100)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let app = app();

        let response = send(&app, Method::POST, "/", r#"{"name":"ferrum"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/name", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_json(response).await, serde_json::json!({"name": "ferrum"}));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let response = send(&app(), Method::GET, "/missing", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_shard_header() {
        let response = send(&app(), Method::GET, "/a", "").await;
        // djb2("a") = 177670, 177670 % 3 == 1
        assert_eq!(response.headers().get(SHARD_HEADER).unwrap(), "1");
    }

    #[tokio::test]
    async fn test_post_path_is_ignored() {
        let app = app();
        let response = send(&app, Method::POST, "/elsewhere", r#"{"k":"v"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/k", "").await;
        assert_eq!(body_json(response).await, serde_json::json!({"k": "v"}));
    }

    #[tokio::test]
    async fn test_malformed_bodies_rejected() {
        let app = app();
        for body in [
            "not json",
            r#"["k","v"]"#,
            r#"{}"#,
            r#"{"a":"1","b":"2"}"#,
            r#"{"k":42}"#,
        ] {
            let response = send(&app, Method::POST, "/", body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_overlong_key_rejected() {
        let key = "k".repeat(MAX_KEY_LEN + 1);
        let body = format!(r#"{{"{}":"v"}}"#, key);
        let response = send(&app(), Method::POST, "/", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_capacity_exceeded() {
        let app = app_with_capacity(1);
        let response = send(&app, Method::POST, "/", r#"{"a":"1"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::POST, "/", r#"{"b":"2"}"#).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete_reports_outcome() {
        let app = app();
        send(&app, Method::POST, "/", r#"{"k":"v"}"#).await;

        let response = send(&app, Method::DELETE, "/k", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"removed": true}));

        let response = send(&app, Method::DELETE, "/k", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"removed": false}));

        let response = send(&app, Method::GET, "/k", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_root_is_empty_key() {
        let app = app();
        let response = send(&app, Method::GET, "/", "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, Method::DELETE, "/", "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nested_path_key() {
        let app = app();
        send(&app, Method::POST, "/", r#"{"users/42":"alice"}"#).await;

        let response = send(&app, Method::GET, "/users/42", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"users/42": "alice"}));
    }
}
