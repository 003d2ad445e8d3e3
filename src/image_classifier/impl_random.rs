use crate::image_classifier::interface::{ClassifierError, ImageClassifier, Prediction};
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use rand::distr::{Distribution, Uniform};
use std::sync::Arc;

/// Stand-in for a trained model, for running the service without a model artifact.
pub struct ImageClassifierRandom {
    vocabulary: Vec<String>,
    logger: Arc<dyn Logger>,
}

impl ImageClassifierRandom {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            vocabulary: vec!["normal".to_string(), "glaucoma".to_string()],
            logger: logger.with_namespace("classifier").with_namespace("random"),
        }
    }
}

impl ImageClassifier for ImageClassifierRandom {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        self.logger.info(&format!(
            "Classifying {}x{} image with random classifier...",
            image.width(),
            image.height()
        ));

        let mut rng = rand::rng();

        let weight_dist =
            Uniform::new(0.05f32, 1.0).map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let weights: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|_| weight_dist.sample(&mut rng))
            .collect();
        let total: f32 = weights.iter().sum();
        let probabilities = weights.iter().map(|w| w / total).collect();

        Prediction::from_probabilities(&self.vocabulary, probabilities)
    }

    fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}
