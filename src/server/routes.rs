use crate::pipeline::{PredictionPipeline, PredictionResponse};
use crate::server::error::ApiError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const SERVICE_TITLE: &str = "Fundus Classifier";
const UPLOAD_FIELD: &str = "file";

pub fn router(pipeline: Arc<PredictionPipeline>, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

async fn root() -> Json<Value> {
    Json(json!({ "title": SERVICE_TITLE }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn predict(
    State(pipeline): State<Arc<PredictionPipeline>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::MalformedUpload(e.body_text()))?;
    let upload = read_upload(multipart).await?;

    let response = tokio::task::spawn_blocking(move || pipeline.predict(&upload))
        .await
        .map_err(|e| ApiError::TaskFailed(e.to_string()))??;

    Ok(Json(response))
}

/// Takes the `file` field, or the first field carrying a file name when none is called `file`.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(e.body_text()))?
    {
        let is_upload_field = field.name() == Some(UPLOAD_FIELD);
        if !is_upload_field && (fallback.is_some() || field.file_name().is_none()) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::MalformedUpload(e.body_text()))?;

        if is_upload_field {
            return Ok(bytes.to_vec());
        }
        fallback = Some(bytes.to_vec());
    }

    fallback.ok_or(ApiError::MissingUpload)
}
