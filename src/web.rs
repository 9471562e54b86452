use std::io::Write;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use include_dir::{include_dir, Dir};
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::analyzer::{analyze_text, AnalysisResponse};
use crate::config::Config;
use crate::error::FraudLensError;
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::transcribe::transcribe_audio;

static WEB_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/web");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub llm: Arc<dyn LlmProvider>,
}

impl AppState {
    /// Build state with the real remote providers. One HTTP client is shared
    /// by both remote calls for the lifetime of the process.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let llm = Arc::new(OpenAiProvider::new(http.clone(), &config));
        AppState {
            config: Arc::new(config),
            http,
            llm,
        }
    }
}

async fn index() -> impl IntoResponse {
    match WEB_ASSETS.get_file("index.html") {
        Some(file) => Html(String::from_utf8_lossy(file.contents()).to_string()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html missing").into_response(),
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}

/// Write an uploaded recording to a scoped temporary file. The file is
/// deleted when the returned guard drops, on every exit path; deletion
/// failures are swallowed by the drop impl.
fn persist_upload(bytes: &[u8]) -> Result<NamedTempFile, FraudLensError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("fraudlens-upload-")
        .suffix(".mp3")
        .tempfile()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    Ok(tmp)
}

/// `POST /analyze`: resolve the working text (transcribing an upload when
/// present, audio wins over text), run the fraud analysis, and return the
/// verdict with the transcript attached.
async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, FraudLensError> {
    let mut audio_bytes: Option<Vec<u8>> = None;
    let mut text_input: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio_file") => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    audio_bytes = Some(bytes.to_vec());
                }
            }
            Some("text_input") => {
                text_input = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let transcript = if let Some(bytes) = audio_bytes {
        let tmp = persist_upload(&bytes)?;
        info!(
            "transcribing {} byte upload with model {}",
            bytes.len(),
            state.config.audio_model
        );
        let audio = tokio::fs::read(tmp.path()).await?;
        transcribe_audio(&state.http, &state.config, audio).await?
    } else {
        match text_input {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(FraudLensError::MissingInput),
        }
    };

    info!("analyzing transcript with model {}", state.config.chat_model);
    let analysis = analyze_text(state.llm.as_ref(), &transcript).await?;

    Ok(Json(AnalysisResponse {
        analysis,
        transcript,
    }))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_mb as usize * 1024 * 1024;
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route(
            "/analyze",
            post(analyze).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

pub async fn start_web_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("fraudlens listening at http://{addr}");
    if let Err(e) = axum::serve(listener, router).await {
        error!("web server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
