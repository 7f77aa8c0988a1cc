#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use autoagents_relay::config::Settings;
use autoagents_relay::routes;
use autoagents_relay::state::AppState;

/// How the mock AutoAgents server answers each chat completion call.
pub enum MockReply {
    /// 200 with a well-formed reply carrying this answer text.
    Answer(String),
    /// The given HTTP status with a JSON error body.
    Status(u16),
    /// 200 with a body that is not valid JSON.
    Malformed,
    /// 200 with a well-formed body whose choices list is empty.
    NoChoices,
}

struct MockState {
    reply: MockReply,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(HeaderMap, Value)>>>,
}

/// In-process stand-in for an AutoAgents platform host.
pub struct MockAgentServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(HeaderMap, Value)>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockAgentServer {
    pub async fn start(reply: MockReply) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let state = Arc::new(MockState {
            reply,
            hits: hits.clone(),
            last_request: last_request.clone(),
        });

        let app = Router::new()
            .route("/openapi/agent/chat/completions/v1", post(chat_completions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("mock server run");
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            last_request,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Number of chat completion calls received so far.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Headers and body of the most recent chat completion call.
    pub fn last_request(&self) -> Option<(HeaderMap, Value)> {
        self.last_request.lock().unwrap().clone()
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

async fn chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = Some((headers, body));

    match &state.reply {
        MockReply::Answer(text) => {
            Json(json!({ "choices": [{ "content": text }] })).into_response()
        }
        MockReply::Status(code) => (
            StatusCode::from_u16(*code).expect("mock status"),
            Json(json!({ "error": "upstream unavailable" })),
        )
            .into_response(),
        MockReply::Malformed => "not json".into_response(),
        MockReply::NoChoices => Json(json!({ "choices": [] })).into_response(),
    }
}

/// Decodes the JSON payloads out of a raw text/event-stream body.
pub fn decode_sse_chunks(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str::<String>(data).expect("chunk is a JSON string"))
        .collect()
}

/// Settings pointing the relay at the given mock server.
pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        agent_id: "agent-0001".to_string(),
        auth_key: "test-key".to_string(),
        auth_secret: "test-secret".to_string(),
        platform: "uat".to_string(),
        agents_host: Some(base_url.to_string()),
    }
}

/// Full relay router wired to the real upstream client.
pub fn relay_app(settings: Settings) -> Router {
    let state = AppState::new(settings).expect("build app state");
    routes::create_routes().with_state(state)
}
