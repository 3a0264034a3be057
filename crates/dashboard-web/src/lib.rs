//! Web front end for the stock dashboard
//!
//! Routes:
//! - `GET /` - the dashboard page with every company's chart and the chat widget
//! - `POST /api/ai` - `{"message": ...}` in, `{"response": ...}` out
//! - `GET /health` - snapshot and assistant status

pub mod error;
pub mod page;

pub use error::{Result, WebError};
pub use page::PageRenderer;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use dashboard_stock::{MarketSnapshot, StockAssistant};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<MarketSnapshot>,
    pub assistant: Arc<StockAssistant>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    /// Bundle the startup products for the router
    pub fn new(snapshot: MarketSnapshot, assistant: StockAssistant) -> Result<Self> {
        Ok(Self {
            snapshot: Arc::new(snapshot),
            assistant: Arc::new(assistant),
            pages: Arc::new(PageRenderer::new()?),
        })
    }
}

/// Chat request body
///
/// `message` may be any JSON value: missing or `null` reads as empty text,
/// strings are taken as-is and anything else as its JSON text.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl AskRequest {
    /// The message as chat text
    pub fn text(&self) -> String {
        match &self.message {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

/// Health report
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub companies: usize,
    pub companies_with_data: usize,
    pub remote_assistant: bool,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/ai", post(ask_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - the dashboard page
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let page = state.pages.render(&state.snapshot)?;
    Ok(Html(page))
}

/// POST /api/ai - answer a chat message
///
/// The body is parsed by hand so that a missing or wrong content type is
/// still accepted; only a body that is not a JSON object is a 400.
#[instrument(skip_all)]
pub async fn ask_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<AskResponse>> {
    let request: AskRequest =
        serde_json::from_slice(&body).map_err(|e| WebError::BadRequest(e.to_string()))?;
    let message = request.text();
    debug!(chars = message.len(), "Chat message received");

    let answer = state.assistant.respond(&message, &state.snapshot).await;
    info!(source = ?answer.source, "Chat message answered");

    Ok(Json(AskResponse {
        response: answer.text,
    }))
}

/// GET /health - snapshot and assistant status
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        companies: state.snapshot.len(),
        companies_with_data: state.snapshot.companies_with_data(),
        remote_assistant: state.assistant.has_remote(),
    })
}
