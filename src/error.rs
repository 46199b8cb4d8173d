use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::render::RenderError;

/// Error type for HTTP handlers.
///
/// Every variant answers with a JSON body `{"error": "..."}`. Server-side
/// causes are logged and never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no file uploaded")]
    MissingFile,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("failed to read layout: {0}")]
    Layout(#[source] std::io::Error),

    #[error("failed to store upload: {0}")]
    Upload(#[source] std::io::Error),

    #[error("failed to read upload: {0}")]
    Blob(#[source] std::io::Error),

    #[error("failed to save template: {0}")]
    Save(#[source] sqlx::Error),

    #[error("failed to fetch templates: {0}")]
    Fetch(#[source] sqlx::Error),

    #[error("failed to render template: {0}")]
    Render(#[from] RenderError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "No file uploaded".into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".into()),
            AppError::Layout(_) => internal("Failed to read template file"),
            AppError::Upload(_) => internal("Failed to store uploaded file"),
            AppError::Blob(_) => internal("Failed to read uploaded file"),
            AppError::Save(_) => internal("Failed to save template"),
            AppError::Fetch(_) => internal("Failed to fetch templates"),
            AppError::Render(_) => internal("Failed to render template"),
        }
    }
}

fn internal(msg: &str) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Rejected request");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
