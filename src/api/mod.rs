//! HTTP API.
//!
//! - `POST /chat` - answer a message within a session
//! - `GET /status` - liveness

mod routes;
pub mod types;

use std::sync::Arc;

use crate::config::Config;
use crate::llm::GeminiClient;
use crate::tools::{BackendClient, ToolCatalog, ToolExecutor};

pub use routes::{router, AppState, SessionStore};

/// Build the shared collaborators from `config` and serve until the process stops.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let catalog = ToolCatalog::builtin();
    for (persona, tool) in catalog.missing_tools() {
        tracing::warn!(persona, tool, "Persona lists a tool the catalog does not define");
    }

    let llm = Arc::new(GeminiClient::from_config(&config)?);
    let backend = BackendClient::from_config(&config)?;
    tracing::info!(backend = %backend.base_url(), model = %llm.model(), "Collaborators ready");
    let executor = Arc::new(ToolExecutor::new(catalog, backend));

    let state = Arc::new(AppState {
        sessions: SessionStore::new(
            llm,
            executor,
            config.max_rounds,
            config.max_sessions,
            config.session_idle,
        ),
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
