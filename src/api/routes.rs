//! HTTP routes and shared state.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::types::{ChatRequest, ChatResponse, ErrorResponse, StatusResponse};
use crate::agent::ChatSession;
use crate::llm::LlmClient;
use crate::tools::ToolExecutor;

/// Conversations keyed by session id, created on first use.
///
/// Each session sits behind its own mutex: requests for the same session are
/// serialized, different sessions run concurrently. At most `max_sessions`
/// are kept; idle or least recently used sessions are evicted.
pub struct SessionStore {
    llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    max_rounds: usize,
    sessions: Cache<String, Arc<Mutex<ChatSession>>>,
}

impl SessionStore {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: Arc<ToolExecutor>,
        max_rounds: usize,
        max_sessions: u64,
        idle: Duration,
    ) -> Self {
        Self {
            llm,
            executor,
            max_rounds,
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
        }
    }

    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<ChatSession>> {
        let llm = Arc::clone(&self.llm);
        let executor = Arc::clone(&self.executor);
        let max_rounds = self.max_rounds;
        let session_id = id.to_string();

        self.sessions
            .get_with(id.to_string(), async move {
                tracing::info!(session_id = %session_id, "Starting new chat session");
                Arc::new(Mutex::new(ChatSession::new(llm, executor, max_rounds)))
            })
            .await
    }

    /// Live sessions, after pending evictions have been applied.
    pub async fn len(&self) -> usize {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Shared application state.
pub struct AppState {
    pub sessions: SessionStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
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

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

async fn chat(State(state): State<Arc<AppState>>, body: bytes::Bytes) -> Response {
    let req: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected chat request body");
            return error_response(StatusCode::BAD_REQUEST, "No message provided");
        }
    };
    if req.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No message provided");
    }

    let session_id = req.session_id().to_string();
    let session = state.sessions.get_or_create(&session_id).await;
    let mut session = session.lock().await;

    match session.chat(&req.message).await {
        Ok(reply) => Json(ChatResponse {
            response: reply.response,
            persona: reply.persona.to_string(),
            session_id,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Chat request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ModelResponse, Turn, TurnContent};
    use crate::tools::{BackendClient, ToolCatalog, ToolDescriptor};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    /// Answers with the latest user text, or fails when asked to.
    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn generate(
            &self,
            _system: &str,
            history: &[Turn],
            _tools: &[&'static ToolDescriptor],
        ) -> anyhow::Result<ModelResponse> {
            let last = history
                .iter()
                .rev()
                .find_map(|t| match &t.content {
                    TurnContent::Text(text) => Some(text.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            if last.contains("explode") {
                anyhow::bail!("model unavailable");
            }
            let user_turns = history.len() / 2 + 1;
            Ok(ModelResponse::Text(format!("echo {} ({})", last, user_turns)))
        }
    }

    async fn spawn_app() -> (String, Arc<AppState>) {
        let backend =
            BackendClient::new("http://127.0.0.1:9/api", None, Duration::from_secs(1)).unwrap();
        let executor = Arc::new(ToolExecutor::new(ToolCatalog::builtin(), backend));
        let state = Arc::new(AppState {
            sessions: SessionStore::new(
                Arc::new(EchoLlm),
                executor,
                4,
                100,
                Duration::from_secs(600),
            ),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    async fn post_chat(base: &str, body: String) -> (StatusCode, Value) {
        let resp = reqwest::Client::new()
            .post(format!("{}/chat", base))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn status_is_ok() {
        let (base, _) = spawn_app().await;
        let body: Value = reqwest::get(format!("{}/status", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn chat_returns_response_and_persona() {
        let (base, state) = spawn_app().await;
        let (status, body) =
            post_chat(&base, json!({"message": "pay my invoice"}).to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["persona"], "financial_assistant");
        assert_eq!(body["session_id"], "default");
        assert_eq!(body["response"], "echo pay my invoice (1)");
        assert_eq!(state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_keep_separate_histories() {
        let (base, state) = spawn_app().await;
        post_chat(&base, json!({"message": "hi", "session_id": "a"}).to_string()).await;
        let (_, second) =
            post_chat(&base, json!({"message": "again", "session_id": "a"}).to_string()).await;
        let (_, other) =
            post_chat(&base, json!({"message": "hi", "session_id": "b"}).to_string()).await;

        assert_eq!(second["response"], "echo again (2)");
        assert_eq!(other["response"], "echo hi (1)");
        assert_eq!(state.sessions.len().await, 2);
    }

    #[tokio::test]
    async fn session_count_stays_within_capacity() {
        let backend =
            BackendClient::new("http://127.0.0.1:9/api", None, Duration::from_secs(1)).unwrap();
        let executor = Arc::new(ToolExecutor::new(ToolCatalog::builtin(), backend));
        let store = SessionStore::new(
            Arc::new(EchoLlm),
            executor,
            4,
            10,
            Duration::from_secs(600),
        );

        for i in 0..50 {
            store.get_or_create(&format!("user-{}", i)).await;
        }
        assert!(store.len().await <= 10);
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn same_id_returns_the_same_session() {
        let (_, state) = spawn_app().await;
        let first = state.sessions.get_or_create("a").await;
        let second = state.sessions.get_or_create("a").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn malformed_requests_are_400() {
        let (base, state) = spawn_app().await;
        for body in [
            "not json".to_string(),
            json!({}).to_string(),
            json!({"message": 42}).to_string(),
            json!({"message": "   "}).to_string(),
        ] {
            let (status, resp) = post_chat(&base, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(resp["error"], "No message provided");
        }
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn loop_failure_is_500() {
        let (base, _) = spawn_app().await;
        let (status, body) =
            post_chat(&base, json!({"message": "explode please"}).to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("model unavailable"));
    }

    #[test]
    fn blank_session_id_falls_back_to_default() {
        let req: ChatRequest =
            serde_json::from_value(json!({"message": "x", "session_id": " "})).unwrap();
        assert_eq!(req.session_id(), "default");
    }
}
