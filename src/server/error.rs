use crate::image_classifier::interface::ClassifierError;
use crate::pipeline::error::{ErrorCategory, PipelineError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no file was uploaded")]
    MissingUpload,
    #[error("malformed upload: {0}")]
    MalformedUpload(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("prediction task failed: {0}")]
    TaskFailed(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    category: &'a str,
    kind: &'a str,
    message: String,
}

impl ApiError {
    fn category(&self) -> ErrorCategory {
        match self {
            ApiError::MissingUpload | ApiError::MalformedUpload(_) => ErrorCategory::InvalidInput,
            ApiError::Pipeline(e) => e.category(),
            ApiError::TaskFailed(_) => ErrorCategory::Internal,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingUpload => "missing_upload",
            ApiError::MalformedUpload(_) => "malformed_upload",
            ApiError::Pipeline(e) => e.kind(),
            ApiError::TaskFailed(_) => "task_failed",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUpload | ApiError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Decode(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Classifier(ClassifierError::ModelUnavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Pipeline(_) | ApiError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                category: self.category().as_str(),
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
