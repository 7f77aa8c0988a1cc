use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{sse::Sse, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::state::AppState;
use crate::streaming;

/// Reply for an empty or missing prompt.
pub const EMPTY_PROMPT_TEXT: &str = "请输入有效的问题";
/// Substituted when the upstream answers with empty text.
pub const FALLBACK_ANSWER: &str = "抱歉，无法获取回答。";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/chat", post(chat))
}

/// Chat request body. `history` (normally a list of role/content turns) is
/// accepted in any JSON shape for wire compatibility but never forwarded
/// upstream.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub history: Value,
}

async fn home() -> Json<Value> {
    Json(json!({ "text": "Welcome to Backend API" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "backend": "running" }))
}

/// Relays one prompt to the agent and streams the answer back as SSE.
async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Response, ServerError> {
    // Parsed by hand from the raw bytes so malformed input (bad JSON, bad
    // UTF-8) surfaces as a 500, not a framework rejection.
    let request: ChatRequest = serde_json::from_slice(&body)?;

    let request_id = Uuid::new_v4();
    info!(
        "[{}] Received prompt ({} chars, {} history messages)",
        request_id,
        request.prompt.chars().count(),
        request.history.as_array().map_or(0, |turns| turns.len())
    );

    if request.prompt.trim().is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "text": EMPTY_PROMPT_TEXT })),
        )
            .into_response());
    }

    let answer = match state.agent.fetch_answer(&request.prompt).await {
        Ok(answer) => answer,
        Err(e) => {
            error!("[{}] Upstream call failed: {}", request_id, e);
            format!("Error: {}", e)
        }
    };
    let answer = if answer.is_empty() {
        FALLBACK_ANSWER.to_string()
    } else {
        answer
    };

    let mut response = Sse::new(streaming::answer_frames(answer)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(response)
}

/// Converts any unhandled error into the JSON 500 payload.
struct ServerError(anyhow::Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Error in chat endpoint: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("Internal server error: {}", self.0) })),
        )
            .into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
