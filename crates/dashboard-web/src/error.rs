//! Error types for the web front end

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Web front end errors
#[derive(Debug, Error)]
pub enum WebError {
    /// Page template failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Request body was not a usable JSON object
    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

/// Result type alias for web operations
pub type Result<T> = std::result::Result<T, WebError>;

impl WebError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
