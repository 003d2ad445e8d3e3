use crate::image_classifier::interface::{ClassifierError, ImageClassifier, Prediction};
use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::tract::image::resize_image_to_tensor;
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::sync::Arc;
use tract_onnx::prelude::*;

const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

pub struct ImageClassifierTractOnnx {
    model: TypedRunnableModel<TypedModel>,
    vocabulary: Vec<String>,
    config: ModelConfig,
    logger: Arc<dyn Logger>,
}

impl ImageClassifierTractOnnx {
    /// Loads the model and its vocabulary. Any failure here means the service must not start.
    pub fn new(config: ModelConfig, logger: Arc<dyn Logger>) -> Result<Self, ClassifierError> {
        let logger = logger.with_namespace("classifier").with_namespace("tract_onnx");

        let vocabulary = load_vocabulary(&config.vocabulary_path)?;

        let (height, width) = config.input_shape;
        let model = tract_onnx::onnx()
            .model_for_path(&config.onnx_model_path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    f32::fact([1, 3, height as usize, width as usize]).into(),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                ClassifierError::ModelUnavailable(format!(
                    "failed to load {}: {}",
                    config.onnx_model_path, e
                ))
            })?;

        logger.info(&format!(
            "Loaded {} with {} classes: {:?}",
            config.onnx_model_path,
            vocabulary.len(),
            vocabulary
        ));

        Ok(Self {
            model,
            vocabulary,
            config,
            logger,
        })
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let input = resize_image_to_tensor(
            image,
            self.config.input_shape.1, // width
            self.config.input_shape.0, // height
        );

        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| ClassifierError::Inference("model produced no outputs".into()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let scores: Vec<f32> = output.iter().copied().collect();
        let prediction = prediction_from_scores(&self.vocabulary, scores).inspect_err(|_| {
            self.logger
                .error(&format!("Unexpected model output shape {:?}", output.shape()));
        })?;

        self.logger.info(&format!(
            "Predicted {} ({:.3})",
            prediction.label, prediction.probabilities[prediction.label_index]
        ));

        Ok(prediction)
    }

    fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

pub fn load_vocabulary(path: &str) -> Result<Vec<String>, ClassifierError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ClassifierError::ModelUnavailable(format!("failed to read vocabulary {}: {}", path, e))
    })?;

    let vocabulary: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if vocabulary.is_empty() {
        return Err(ClassifierError::ModelUnavailable(format!(
            "vocabulary {} is empty",
            path
        )));
    }

    Ok(vocabulary)
}

/// Aligns raw model output to the vocabulary and picks the most probable class.
pub fn prediction_from_scores(
    vocabulary: &[String],
    scores: Vec<f32>,
) -> Result<Prediction, ClassifierError> {
    if scores.len() != vocabulary.len() {
        return Err(ClassifierError::Inference(format!(
            "model produced {} scores for a vocabulary of {}",
            scores.len(),
            vocabulary.len()
        )));
    }

    Prediction::from_probabilities(vocabulary, to_probabilities(scores))
}

/// Passes an existing probability distribution through, otherwise treats the scores as logits.
pub fn to_probabilities(scores: Vec<f32>) -> Vec<f32> {
    let is_distribution = scores.iter().all(|s| (0.0..=1.0).contains(s))
        && (scores.iter().sum::<f32>() - 1.0).abs() <= DISTRIBUTION_TOLERANCE;

    if is_distribution {
        scores
    } else {
        softmax(&scores)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}
