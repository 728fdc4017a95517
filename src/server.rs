//! HTTP API for uploads, analysis and presentation generation.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/parse-file` | Extract one uploaded file (multipart field `file`) |
//! | `POST` | `/api/analyze` | Ingest a batch of uploads and run the analyzer |
//! | `POST` | `/api/generate-presentation` | Render analysis JSON to an HTML document |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one shape:
//!
//! ```json
//! { "error": { "code": "unsupported_format", "message": "...", "filename": "x.bin", "fileType": "bin" } }
//! ```
//!
//! Error codes: `no_file` (400), `unsupported_format` (400),
//! `missing_input` (400), `bad_request` (400), `extraction_failed` (500),
//! `analysis_failed` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser front end
//! can be served from anywhere.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::analysis::{create_analyzer, Analyzer};
use crate::config::Config;
use crate::ingest::{ingest_concurrent, ingest_one};
use crate::models::{AnalysisResult, ExtractedDocument, RawFile};
use crate::render::{PresentationRequest, SynthesisError};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    analyzer: Arc<dyn Analyzer>,
}

/// Builds the application router with all routes and layers attached.
///
/// Exposed separately from [`run_server`] so handlers can be driven
/// in-process (e.g. with `tower::ServiceExt::oneshot`).
pub fn router(config: &Config) -> anyhow::Result<Router> {
    let analyzer: Arc<dyn Analyzer> = Arc::from(create_analyzer(&config.analysis)?);
    let state = AppState {
        config: Arc::new(config.clone()),
        analyzer,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/api/parse-file", post(handle_parse_file))
        .route("/api/analyze", post(handle_analyze))
        .route("/api/generate-presentation", post(handle_generate))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Starts the HTTP server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = router(config)?;
    let bind_addr = config.server.bind.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind = %bind_addr, analyzer = %config.analysis.provider, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_type: Option<String>,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    file: Option<(String, String)>,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            file: None,
        }
    }

    fn for_file(mut self, raw: &RawFile) -> Self {
        self.file = Some((raw.name.clone(), raw.declared_extension.clone()));
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (filename, file_type) = match self.file {
            Some((name, ext)) => (Some(name), Some(ext)),
            None => (None, None),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
                filename,
                file_type,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn internal(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::MissingInput { .. } => {
                AppError::new(StatusCode::BAD_REQUEST, "missing_input", err.to_string())
            }
        }
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct ParseResponse {
    success: bool,
    #[serde(flatten)]
    document: ExtractedDocument,
}

/// `POST /api/parse-file`: extracts the first `file` part.
async fn handle_parse_file(mut multipart: Multipart) -> Result<Json<ParseResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
        upload = Some(RawFile::new(name, bytes.to_vec()));
        break;
    }

    let raw = upload.ok_or_else(|| {
        AppError::new(StatusCode::BAD_REQUEST, "no_file", "No file uploaded")
    })?;

    let job = raw.clone();
    let result = tokio::task::spawn_blocking(move || ingest_one(&job))
        .await
        .map_err(|e| internal(format!("extraction task aborted: {}", e)))?;

    match result {
        Ok(document) => Ok(Json(ParseResponse {
            success: true,
            document,
        })),
        Err(e) if e.is_client_error() => Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "unsupported_format",
            format!("Unsupported file type: .{}", raw.declared_extension),
        )
        .for_file(&raw)),
        Err(e) => {
            warn!(file = %raw.name, error = %e, "extraction failed");
            Err(AppError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "extraction_failed",
                e.to_string(),
            )
            .for_file(&raw))
        }
    }
}

#[derive(Serialize)]
struct AnalyzeResponse {
    success: bool,
    documents: Vec<ExtractedDocument>,
    analysis: AnalysisResult,
}

/// `POST /api/analyze`: ingests every `file` part and runs the analyzer.
async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut files = Vec::new();
    let mut instructions = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                files.push(RawFile::new(name, bytes.to_vec()));
            }
            Some("instructions") => {
                instructions = Some(field.text().await.map_err(|e| bad_request(e.body_text()))?);
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "no_file",
            "No files uploaded",
        ));
    }

    let documents = ingest_concurrent(files).await;
    let analysis = state
        .analyzer
        .analyze(&documents, instructions.as_deref())
        .await
        .map_err(|e| {
            warn!(analyzer = state.analyzer.name(), error = %e, "analysis failed");
            AppError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis_failed",
                format!("{:#}", e),
            )
        })?;

    Ok(Json(AnalyzeResponse {
        success: true,
        documents,
        analysis,
    }))
}

#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    html: String,
    size: usize,
}

/// `POST /api/generate-presentation`: renders analysis JSON to HTML.
async fn handle_generate(
    State(state): State<AppState>,
    body: Result<Json<PresentationRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = body.map_err(|e| bad_request(e.body_text()))?;
    let rendered = request.render(&state.config.render)?;
    Ok(Json(GenerateResponse {
        success: true,
        html: rendered.html,
        size: rendered.size,
    }))
}

/// `GET /health`
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
