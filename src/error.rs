use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::envelope::ErrorEnvelope;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("invalid parameter: {0}")]
    Validation(String),

    #[error("source '{source_name}' is unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid event record: {0}")]
    InvalidRecord(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FinderError {
    pub fn upstream(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        FinderError::UpstreamUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FinderError::Validation(_) => StatusCode::BAD_REQUEST,
            FinderError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FinderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the logs; callers get a readable summary.
        let message = match &self {
            FinderError::Validation(_)
            | FinderError::NotFound(_)
            | FinderError::UpstreamUnavailable { .. } => self.to_string(),
            other => {
                tracing::error!(error = %other, "request failed");
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorEnvelope::new(message))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
