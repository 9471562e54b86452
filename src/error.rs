use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum FraudLensError {
    #[error("please provide a recording or text")]
    MissingInput,

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for FraudLensError {
    fn into_response(self) -> Response {
        let status = match self {
            FraudLensError::MissingInput | FraudLensError::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
