//! HTTP routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use toolrelay_core::{
    create_provider, ChannelSink, ChatMessage, McpServerConfig, Orchestrator, OrchestratorResult,
    Provider, ResolvedConfig, RunOutcome, RunSettings, SecretStore, SharedLogger, ToolCatalog,
    ToolHostConnector,
};

use crate::sse::sse_response;

/// Fragments buffered between the orchestrator and the HTTP body
const RELAY_BUFFER: usize = 32;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ResolvedConfig>,
    pub secrets: Arc<dyn SecretStore>,
    /// Opens the per-request tool host session
    pub connector: Arc<dyn ToolHostConnector>,
    pub logger: SharedLogger,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Everything a cycle needs, checked before the stream starts
struct Prepared {
    provider: Arc<dyn Provider>,
    server_name: String,
    server: McpServerConfig,
    settings: RunSettings,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn internal_error(detail: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail })).into_response()
}

fn prepare(state: &AppState, request: &ChatRequest) -> Result<Prepared, String> {
    let config = &state.config;
    let provider = create_provider(&config.llm, state.secrets.as_ref(), state.logger.clone())
        .map_err(|e| e.to_string())?;
    let (server_name, server) = config.select_server(None).map_err(|e| e.to_string())?;
    let model = config
        .model(request.model_name.as_deref())
        .map_err(|e| e.to_string())?;

    Ok(Prepared {
        provider,
        server_name,
        server,
        settings: RunSettings::from_request(&config.request, model).with_stream(true),
    })
}

/// `POST /api/chat`: answer one question as an SSE stream
async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let prepared = match prepare(&state, &request) {
        Ok(prepared) => prepared,
        Err(detail) => {
            state.logger.error(&format!("[Server] Rejecting chat request: {}", detail));
            return internal_error(detail);
        }
    };

    state.logger.info(&format!(
        "[Server] Chat request for model {} via {}",
        prepared.settings.options.model, prepared.server_name
    ));

    let (sink, rx) = ChannelSink::channel(RELAY_BUFFER);
    tokio::spawn(run_cycle(state, prepared, request.query, sink));

    sse_response(rx)
}

/// Background task owning one MCP session for the request
async fn run_cycle(state: AppState, prepared: Prepared, query: String, sink: ChannelSink) {
    let logger = state.logger.clone();

    let host = match state.connector.connect(&prepared.server_name, &prepared.server).await {
        Ok(host) => host,
        Err(e) => {
            logger.error(&format!("[Server] Could not reach {}: {}", prepared.server_name, e));
            return;
        }
    };

    let catalog = Arc::new(ToolCatalog::new(host.clone(), logger.clone()));
    let conversation = vec![
        ChatMessage::system(state.config.system_prompt.clone()),
        ChatMessage::user(query),
    ];

    match drive(&state, prepared, catalog, conversation, sink).await {
        Ok(outcome) => logger.info(&format!(
            "[Server] Answered after {} tool rounds ({} calls)",
            outcome.tool_rounds, outcome.tool_calls
        )),
        Err(e) => logger.error(&format!("[Server] Chat cycle failed: {}", e)),
    }

    if let Err(e) = host.close().await {
        logger.warn(&format!("[Server] Error closing MCP session: {}", e));
    }
}

async fn drive(
    state: &AppState,
    prepared: Prepared,
    catalog: Arc<ToolCatalog>,
    mut conversation: Vec<ChatMessage>,
    sink: ChannelSink,
) -> OrchestratorResult<RunOutcome> {
    catalog.activate().await?;

    let orchestrator = Orchestrator::new(
        prepared.provider,
        catalog,
        prepared.settings,
        state.logger.clone(),
    )
    .with_sink(Arc::new(sink));

    orchestrator.run(&mut conversation).await
}
