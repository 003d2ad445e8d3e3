use crate::image_classifier::interface::{ClassifierError, ImageClassifier, Prediction};
use image::DynamicImage;

/// Returns the same prediction for every image.
pub struct ImageClassifierFake {
    vocabulary: Vec<String>,
    probabilities: Vec<f32>,
}

impl ImageClassifierFake {
    pub fn new(vocabulary: &[&str], probabilities: &[f32]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|c| c.to_string()).collect(),
            probabilities: probabilities.to_vec(),
        }
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn predict(&self, _image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        Prediction::from_probabilities(&self.vocabulary, self.probabilities.clone())
    }

    fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

/// Fails every forward pass.
pub struct ImageClassifierFailing {
    vocabulary: Vec<String>,
}

impl ImageClassifierFailing {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ImageClassifier for ImageClassifierFailing {
    fn predict(&self, _image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        Err(ClassifierError::Inference("forward pass failed".to_string()))
    }

    fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}
