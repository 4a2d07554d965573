use crate::config::Config;
use crate::detection::{RoboflowDetector, TextDetector};
use crate::engines;
use crate::error::ApiError;
use crate::extractor::RegionExtractor;
use crate::rasterizer::{PageRasterizer, PdftoppmRasterizer};
use crate::upload::{self, ALLOWED_EXTENSIONS};
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart field carrying the resume
const RESUME_FIELD: &str = "resume";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: RegionExtractor,
    pub rasterizer: Arc<dyn PageRasterizer>,
    pub config: Arc<Config>,
}

/// Extraction response
#[derive(Serialize)]
pub struct ExtractTextResponse {
    pub extracted_text: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub supported_extensions: Vec<String>,
    pub detector_available: bool,
    pub ocr_engine: Option<String>,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    let detector: Option<Arc<dyn TextDetector>> = match RoboflowDetector::new(&config.detection) {
        Ok(detector) => {
            tracing::info!("Roboflow initialized successfully");
            Some(Arc::new(detector))
        }
        Err(e) => {
            tracing::error!("Error initializing Roboflow: {}", e);
            None
        }
    };

    // Model downloads block, keep them off the runtime threads
    let engine_config = config.clone();
    let ocr = tokio::task::spawn_blocking(move || engines::init(&engine_config)).await?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        extractor: RegionExtractor::new(detector, ocr),
        rasterizer: Arc::new(PdftoppmRasterizer::new(config.pdf_dpi)),
        config: Arc::new(config),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/extract_text", post(handle_extract_text))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .with_state(state)
}

/// Handle resume uploads
async fn handle_extract_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    let start = Instant::now();

    // A body that is not multipart at all carries no file
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Request is not multipart: {}", e);
        ApiError::MissingFile
    })?;

    let (filename, data) = read_resume_field(multipart, state.config.max_file_size)
        .await?
        .ok_or(ApiError::MissingFile)?;

    let kind = upload::validate_filename(&filename)?;
    let path = upload::persist(&state.config.upload_dir, &filename, &data).await?;

    let extractor = state.extractor.clone();
    let rasterizer = state.rasterizer.clone();
    let scratch_dir = state.config.upload_dir.clone();
    let extracted_text = tokio::task::spawn_blocking(move || {
        extractor.extract_document(rasterizer.as_ref(), &path, kind, &scratch_dir)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))?;

    tracing::info!(
        "Text extraction completed successfully in {}ms, text length: {}",
        start.elapsed().as_millis(),
        extracted_text.len()
    );

    Ok(Json(ExtractTextResponse { extracted_text }))
}

/// Find the first file part named `resume`. Parts without a filename are
/// plain form values and do not count as an upload.
async fn read_resume_field(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<Option<(String, Bytes)>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::FileTooLarge { max: max_file_size }
        } else {
            ApiError::InvalidRequest(format!("Failed to parse multipart: {}", e))
        }
    })? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::FileTooLarge { max: max_file_size }
            } else {
                ApiError::InvalidRequest(format!("Failed to read file data: {}", e))
            }
        })?;
        return Ok(Some((filename, data)));
    }

    Ok(None)
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        supported_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        detector_available: state.extractor.detector_available(),
        ocr_engine: state.extractor.ocr_engine_name().map(str::to_string),
        max_file_size_bytes: state.config.max_file_size,
    })
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("Handler panicked: {}", detail)).into_response()
}
