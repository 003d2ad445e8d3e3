pub mod error;

use crate::annotation::annotate;
use crate::chart::interface::ChartRenderer;
use crate::image_classifier::interface::ImageClassifier;
use crate::image_decoder::decode_image;
use crate::library::logger::interface::Logger;
use base64::{prelude::BASE64_STANDARD, Engine};
use self::error::PipelineError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub pred: String,
    pub probs: Vec<f32>,
    pub classes: Vec<String>,
    pub knowledge: String,
    pub chart_base64: String,
}

/// Decode, classify, annotate. Holds only read-only collaborators, so one
/// instance serves every request concurrently.
pub struct PredictionPipeline {
    classifier: Arc<dyn ImageClassifier>,
    chart_renderer: Arc<dyn ChartRenderer>,
    logger: Arc<dyn Logger>,
}

impl PredictionPipeline {
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        chart_renderer: Arc<dyn ChartRenderer>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            classifier,
            chart_renderer,
            logger: logger.with_namespace("pipeline"),
        }
    }

    pub fn predict(&self, upload: &[u8]) -> Result<PredictionResponse, PipelineError> {
        let image = decode_image(upload).inspect_err(|e| {
            self.logger.warn(&format!("Rejected upload of {} bytes: {}", upload.len(), e));
        })?;

        let vocabulary = self.classifier.vocabulary();
        let prediction = self
            .classifier
            .predict(&image)
            .and_then(|prediction| prediction.validate(vocabulary).map(|_| prediction))
            .inspect_err(|e| self.logger.error(&e.to_string()))?;

        self.logger.info(&format!(
            "Classified {}x{} image as {} ({:.3})",
            image.width(),
            image.height(),
            prediction.label,
            prediction.probabilities[prediction.label_index]
        ));

        let annotation = annotate(vocabulary, &prediction, self.chart_renderer.as_ref())
            .inspect_err(|e| self.logger.error(&e.to_string()))?;

        Ok(PredictionResponse {
            pred: prediction.label,
            probs: prediction.probabilities,
            classes: vocabulary.to_vec(),
            knowledge: annotation.knowledge.to_string(),
            chart_base64: BASE64_STANDARD.encode(&annotation.chart_png),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::knowledge::NO_KNOWLEDGE;
    use crate::chart::impl_fake::{ChartRendererFailing, ChartRendererFake, FAKE_CHART_BYTES};
    use crate::chart::impl_raster::ChartRendererRaster;
    use crate::image_classifier::impl_fake::{ImageClassifierFailing, ImageClassifierFake};
    use crate::image_classifier::interface::{ClassifierError, Prediction};
    use crate::image_classifier::test::fixture::fundus_png;
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::pipeline::error::ErrorCategory;
    use image::DynamicImage;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(LoggerConsole::new(chrono::FixedOffset::east_opt(0).unwrap()))
    }

    fn pipeline(
        classifier: impl ImageClassifier + 'static,
        renderer: impl ChartRenderer + 'static,
    ) -> PredictionPipeline {
        PredictionPipeline::new(Arc::new(classifier), Arc::new(renderer), logger())
    }

    #[test]
    fn test_glaucoma_prediction() {
        let pipeline = pipeline(
            ImageClassifierFake::new(&["normal", "glaucoma"], &[0.1, 0.9]),
            ChartRendererFake::new(),
        );

        let response = pipeline.predict(&fundus_png()).unwrap();

        assert_eq!(response.pred, "glaucoma");
        assert_eq!(response.probs, vec![0.1, 0.9]);
        assert_eq!(response.classes, vec!["normal", "glaucoma"]);
        assert!(response.knowledge.starts_with("Glaucoma:"));
        assert_eq!(
            BASE64_STANDARD.decode(&response.chart_base64).unwrap(),
            FAKE_CHART_BYTES
        );
    }

    #[test]
    fn test_response_invariants() {
        let pipeline = pipeline(
            ImageClassifierFake::new(&["cataract", "glaucoma", "normal"], &[0.2, 0.3, 0.5]),
            ChartRendererFake::new(),
        );

        let response = pipeline.predict(&fundus_png()).unwrap();

        assert_eq!(response.probs.len(), response.classes.len());
        let sum: f32 = response.probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        let index = response.classes.iter().position(|c| *c == response.pred).unwrap();
        assert_eq!(response.classes[index], response.pred);
        assert!(response.knowledge.starts_with("Normal fundus"));
    }

    #[test]
    fn test_unknown_class_with_real_chart() {
        let pipeline = pipeline(
            ImageClassifierFake::new(&["normal", "glaucoma", "cataract"], &[0.15, 0.05, 0.8]),
            ChartRendererRaster::new(None),
        );

        let response = pipeline.predict(&fundus_png()).unwrap();

        assert_eq!(response.pred, "cataract");
        assert_eq!(response.knowledge, NO_KNOWLEDGE);

        let png = BASE64_STANDARD.decode(&response.chart_base64).unwrap();
        let chart = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .unwrap()
            .to_rgb8();
        assert!(chart.pixels().any(|p| p.0 == [0, 128, 0]));
        assert!(chart.pixels().any(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn test_vocabulary_without_glaucoma_still_succeeds() {
        let renderer = Arc::new(ChartRendererFake::new());
        let pipeline = PredictionPipeline::new(
            Arc::new(ImageClassifierFake::new(&["cataract", "normal"], &[0.4, 0.6])),
            renderer.clone(),
            logger(),
        );

        let response = pipeline.predict(&fundus_png()).unwrap();

        assert_eq!(response.pred, "normal");

        let rendered = renderer.rendered();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].bars[0].label, "normal");
        assert_eq!(rendered[0].bars[0].value, 0.6);
        assert_eq!(rendered[0].bars[1].label, "glaucoma");
        assert_eq!(rendered[0].bars[1].value, 0.0);
    }

    #[test]
    fn test_random_bytes_are_invalid_input() {
        let pipeline = pipeline(
            ImageClassifierFake::new(&["normal", "glaucoma"], &[0.1, 0.9]),
            ChartRendererFake::new(),
        );

        let err = pipeline.predict(b"definitely not an image").unwrap_err();

        assert_eq!(err.category(), ErrorCategory::InvalidInput);
        assert_eq!(err.kind(), "invalid_image");
    }

    #[test]
    fn test_inference_failure_is_internal() {
        let pipeline = pipeline(
            ImageClassifierFailing::new(&["normal", "glaucoma"]),
            ChartRendererFake::new(),
        );

        let err = pipeline.predict(&fundus_png()).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.kind(), "inference");
    }

    #[test]
    fn test_chart_failure_is_internal() {
        let pipeline = pipeline(
            ImageClassifierFake::new(&["normal", "glaucoma"], &[0.1, 0.9]),
            ChartRendererFailing,
        );

        let err = pipeline.predict(&fundus_png()).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.kind(), "chart_render");
    }

    struct MisalignedClassifier {
        vocabulary: Vec<String>,
    }

    impl ImageClassifier for MisalignedClassifier {
        fn predict(&self, _image: &DynamicImage) -> Result<Prediction, ClassifierError> {
            Ok(Prediction {
                label: "glaucoma".to_string(),
                label_index: 0,
                probabilities: vec![0.1, 0.9],
            })
        }

        fn vocabulary(&self) -> &[String] {
            &self.vocabulary
        }
    }

    #[test]
    fn test_misaligned_prediction_is_rejected() {
        let pipeline = pipeline(
            MisalignedClassifier {
                vocabulary: vec!["normal".to_string(), "glaucoma".to_string()],
            },
            ChartRendererFake::new(),
        );

        let err = pipeline.predict(&fundus_png()).unwrap_err();

        assert_eq!(err.kind(), "inference");
    }
}
