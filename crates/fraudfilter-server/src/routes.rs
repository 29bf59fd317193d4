//! HTTP routes and handlers

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, State,
    },
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fraudfilter_classifiers::ReviewSource;
use fraudfilter_core::{AnalysisReport, Error as CoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ingest::{self, CsvError};
use crate::scraper::ScrapeError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/upload", post(upload))
        .route("/analyze", post(analyze))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Fake Product Detection API is running!" }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_error: Option<String>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.pipeline.registry();
    let model_ready = registry.is_ready();

    Json(HealthResponse {
        status: if model_ready { "ok" } else { "degraded" },
        model_ready,
        model_error: registry.unavailable_reason().map(str::to_string),
    })
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// `/upload` success body
#[derive(Debug, Serialize)]
struct UploadResponse {
    message: &'static str,
    request_id: Uuid,
    #[serde(flatten)]
    report: AnalysisReport,
}

/// Analyze an uploaded CSV of reviews
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    metrics::counter!("fraudfilter_requests_total", "route" => "upload").increment(1);
    let request_id = Uuid::new_v4();

    ensure_ready(&state)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::InvalidRequest("No selected file".to_string()));
        }
        if !filename.to_ascii_lowercase().ends_with(".csv") {
            return Err(AppError::InvalidRequest(
                "Invalid file format. Please upload a CSV file.".to_string(),
            ));
        }

        upload = Some((filename, field.bytes().await?));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::InvalidRequest("No file provided".to_string()))?;
    info!(%request_id, "Processing upload '{}' ({} bytes)", filename, bytes.len());

    let pipeline = state.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || -> Result<AnalysisReport, AppError> {
        let table = ingest::parse_csv(&bytes)?;
        Ok(pipeline.analyze(ReviewSource::Tabular(table))?)
    })
    .await??;

    Ok(Json(UploadResponse {
        message: "File processed successfully",
        request_id,
        report,
    }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    url: Option<String>,
}

/// `/analyze` success body
#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    message: &'static str,
    request_id: Uuid,
    product_name: String,
    csv_file_path: Option<String>,
    #[serde(flatten)]
    report: AnalysisReport,
}

/// Scrape a product page and analyze its reviews
async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    metrics::counter!("fraudfilter_requests_total", "route" => "analyze").increment(1);
    let request_id = Uuid::new_v4();

    ensure_ready(&state)?;

    let Json(req) = payload?;
    let url = req
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No URL provided".to_string()))?;

    let scraper = state.scraper.clone().ok_or(AppError::ScraperUnavailable)?;
    info!(%request_id, "Scraping reviews for {}", url);
    let scrape = scraper.scrape(&url).await?;

    let pipeline = state.pipeline.clone();
    let report =
        tokio::task::spawn_blocking(move || pipeline.analyze(ReviewSource::Scrape(scrape)))
            .await??;

    let (product_name, csv_file_path) = report
        .product
        .as_ref()
        .map(|p| (p.product_name.clone(), p.csv_path.clone()))
        .unwrap_or_default();

    Ok(Json(AnalyzeResponse {
        message: "URL processed successfully",
        request_id,
        product_name,
        csv_file_path,
        report,
    }))
}

fn ensure_ready(state: &AppState) -> Result<(), AppError> {
    state.pipeline.registry().models()?;
    Ok(())
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    Pipeline(CoreError),
    InvalidRequest(String),
    Upload(MultipartError),
    ScraperUnavailable,
    Scraper(ScrapeError),
    NotFound,
    InternalError(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::Pipeline(err) => err.kind(),
            AppError::InvalidRequest(_) | AppError::Upload(_) => "invalid_request",
            AppError::ScraperUnavailable => "scraper_unavailable",
            AppError::Scraper(_) => "scraper_error",
            AppError::NotFound => "not_found",
            AppError::InternalError(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Pipeline(err) => match err {
                CoreError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::Schema(_) => StatusCode::BAD_REQUEST,
                CoreError::EmptyInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(err) => err.status(),
            AppError::ScraperUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Scraper(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<CsvError> for AppError {
    fn from(err: CsvError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::InvalidRequest(err.body_text())
    }
}

impl From<ScrapeError> for AppError {
    fn from(err: ScrapeError) -> Self {
        AppError::Scraper(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("analysis task failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            AppError::Pipeline(err) => err.to_string(),
            AppError::InvalidRequest(msg) | AppError::InternalError(msg) => msg,
            AppError::Upload(err) => err.body_text(),
            AppError::ScraperUnavailable => "No scraper endpoint configured".to_string(),
            AppError::Scraper(err) => err.to_string(),
            AppError::NotFound => "Not found".to_string(),
        };

        if status.is_server_error() {
            error!("Request failed ({}): {}", kind, message);
        } else {
            warn!("Request rejected ({}): {}", kind, message);
        }
        metrics::counter!("fraudfilter_errors_total", "kind" => kind).increment(1);

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
