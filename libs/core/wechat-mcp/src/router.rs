//! HTTP surface of the protocol dispatcher.
//!
//! A single `/mcp` endpoint carries the JSON-RPC traffic; session identity
//! travels in the `mcp-session-id` header. Session-routing failures are
//! JSON-RPC protocol errors (`-32000`) so callers can tell transport misuse
//! apart from publishing failures.

use crate::mcp::{McpHandler, McpRequest, McpResponse};
use crate::publisher::DraftPublisher;
use crate::session::SessionStore;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Header carrying the session id on requests and initialize responses.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Shared dispatcher state: the session store plus the publisher handed to
/// every new session's handler.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<SessionStore>,
    publisher: Arc<DraftPublisher>,
}

impl AppState {
    pub fn new(publisher: Arc<DraftPublisher>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            publisher,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Build the dispatcher router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp).delete(handle_close))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn protocol_error(
    status: StatusCode,
    id: Option<Value>,
    code: i32,
    message: impl Into<String>,
) -> Response {
    (status, Json(McpResponse::error(id, code, message))).into_response()
}

fn respond(response: Option<McpResponse>, session_id: &str) -> Response {
    match response {
        Some(response) => {
            let mut http_response = (StatusCode::OK, Json(response)).into_response();
            if let Ok(value) = HeaderValue::from_str(session_id) {
                http_response.headers_mut().insert(SESSION_HEADER, value);
            }
            http_response
        }
        // Notifications carry no reply.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_mcp(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request: McpRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return protocol_error(
                StatusCode::BAD_REQUEST,
                None,
                -32700,
                format!("Parse error: {e}"),
            );
        }
    };

    match extract_session_id(&headers) {
        Some(session_id) => match state.sessions.get(&session_id) {
            Some(handler) => respond(handler.handle(request).await, &session_id),
            None => {
                warn!("rejected request for unknown session {session_id}");
                protocol_error(
                    StatusCode::NOT_FOUND,
                    request.id,
                    -32000,
                    "Invalid session: unknown session id",
                )
            }
        },
        None if request.method == "initialize" => {
            let handler = Arc::new(McpHandler::new(Arc::clone(&state.publisher)));
            let session_id = state.sessions.create(Arc::clone(&handler));
            respond(handler.handle(request).await, &session_id)
        }
        None => protocol_error(
            StatusCode::BAD_REQUEST,
            request.id,
            -32000,
            "Bad request: no valid session ID provided",
        ),
    }
}

async fn handle_close(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match extract_session_id(&headers) {
        Some(session_id) if state.sessions.remove(&session_id) => {
            info!("transport closed for session {session_id}");
            StatusCode::NO_CONTENT.into_response()
        }
        Some(_) => protocol_error(
            StatusCode::NOT_FOUND,
            None,
            -32000,
            "Invalid session: unknown session id",
        ),
        None => protocol_error(
            StatusCode::BAD_REQUEST,
            None,
            -32000,
            "Bad request: no valid session ID provided",
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> Response {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
