use crate::chart::interface::ChartError;
use crate::image_classifier::interface::ClassifierError;
use crate::image_decoder::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Internal => "internal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Decode(_) => ErrorCategory::InvalidInput,
            PipelineError::Classifier(_) | PipelineError::Chart(_) => ErrorCategory::Internal,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "invalid_image",
            PipelineError::Classifier(ClassifierError::ModelUnavailable(_)) => "model_unavailable",
            PipelineError::Classifier(ClassifierError::Inference(_)) => "inference",
            PipelineError::Chart(_) => "chart_render",
        }
    }
}
