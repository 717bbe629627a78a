use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Inconsistent artifacts: {0}")]
    Inconsistent(String),

    #[error("Checksum mismatch for {file}: expected {expected}, found {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Manifest lists a checksum for unknown artifact {0}")]
    UnknownArtifact(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("vocabulary is empty")]
    Empty,

    #[error("duplicate token '{0}'")]
    Duplicate(String),

    #[error("column {column} of '{token}' is outside 0..{size}")]
    ColumnOutOfRange {
        token: String,
        column: usize,
        size: usize,
    },

    #[error("column {column} shared by '{first}' and '{second}'")]
    SharedColumn {
        column: usize,
        first: String,
        second: String,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced by the HTTP handlers. Fetch failures are not among them:
/// those become an `ANALYSIS_ERROR` verdict.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(_) => {
                tracing::debug!("Rejected request: {}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub fn validation_error(msg: &str) -> AppError {
    AppError::InvalidInput(msg.to_string())
}
