//! HTTP boundary: routes, handlers and error mapping.

use axon_agent::{AgentResponse, AgentService, QueryRequest, UploadResponse};
use axon_core::AppError;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AgentService>,
}

impl AppState {
    pub fn new(service: Arc<AgentService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/execute", post(execute))
        .route("/upload-document", post(upload_document))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK" })
}

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let response = state
        .service
        .execute(&request.session_id, &request.query, request.enable_web_search)
        .await?;
    Ok(Json(response))
}

async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(malformed)?;
        tracing::info!(filename = %filename, bytes = bytes.len(), "Received upload");

        let response = state
            .service
            .upload_document(&filename, bytes.to_vec())
            .await?;
        return Ok(Json(response));
    }

    Err(AppError::InvalidUpload("No file provided.".to_string()).into())
}

fn malformed(err: axum::extract::multipart::MultipartError) -> ApiError {
    AppError::InvalidUpload(format!("Malformed upload: {}", err)).into()
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

/// [`AppError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            tracing::error!("Request failed: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {}", self.0),
            )
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
