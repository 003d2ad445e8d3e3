use image::DynamicImage;

const PROBABILITY_SUM_TOLERANCE: f32 = 1e-3;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// One forward pass worth of output, aligned to the classifier's vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub label_index: usize,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Builds a prediction by taking the most probable class. Ties go to the lowest index.
    pub fn from_probabilities(
        vocabulary: &[String],
        probabilities: Vec<f32>,
    ) -> Result<Self, ClassifierError> {
        let mut best: Option<(usize, f32)> = None;
        for (index, &p) in probabilities.iter().enumerate() {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((index, p)),
            }
        }

        let (label_index, _) =
            best.ok_or_else(|| ClassifierError::Inference("empty probability vector".into()))?;
        let label = vocabulary.get(label_index).cloned().ok_or_else(|| {
            ClassifierError::Inference(format!(
                "class index {} outside vocabulary of {}",
                label_index,
                vocabulary.len()
            ))
        })?;

        Ok(Self {
            label,
            label_index,
            probabilities,
        })
    }

    /// Checks the prediction against the vocabulary it claims to be aligned to.
    pub fn validate(&self, vocabulary: &[String]) -> Result<(), ClassifierError> {
        if self.probabilities.len() != vocabulary.len() {
            return Err(ClassifierError::Inference(format!(
                "{} probabilities for a vocabulary of {}",
                self.probabilities.len(),
                vocabulary.len()
            )));
        }

        if self.probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::Inference(
                "probability vector contains non-finite values".into(),
            ));
        }

        let sum: f32 = self.probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(ClassifierError::Inference(format!(
                "probabilities sum to {}",
                sum
            )));
        }

        match vocabulary.get(self.label_index) {
            Some(label) if *label == self.label => Ok(()),
            Some(label) => Err(ClassifierError::Inference(format!(
                "label {:?} does not match vocabulary entry {:?} at index {}",
                self.label, label, self.label_index
            ))),
            None => Err(ClassifierError::Inference(format!(
                "label index {} outside vocabulary",
                self.label_index
            ))),
        }
    }
}

/// A loaded, read-only classifier shared by every request.
pub trait ImageClassifier: Send + Sync {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError>;

    /// Class names in output order. The only source of truth for label/index alignment.
    fn vocabulary(&self) -> &[String];
}
