use crate::image_classifier::impl_fake::{ImageClassifierFailing, ImageClassifierFake};
use crate::image_classifier::impl_random::ImageClassifierRandom;
use crate::image_classifier::interface::{ClassifierError, ImageClassifier};
use crate::image_classifier::test::fixture::fundus_image;
use crate::library::logger::impl_console::LoggerConsole;
use std::sync::Arc;

#[test]
fn test_fake_returns_configured_prediction() {
    let classifier = ImageClassifierFake::new(&["normal", "glaucoma"], &[0.1, 0.9]);

    let prediction = classifier.predict(&fundus_image(32)).unwrap();

    assert_eq!(prediction.label, "glaucoma");
    assert_eq!(prediction.label_index, 1);
    assert_eq!(prediction.probabilities, vec![0.1, 0.9]);
    assert_eq!(classifier.vocabulary()[prediction.label_index], prediction.label);
}

#[test]
fn test_failing_classifier_reports_inference_error() {
    let classifier = ImageClassifierFailing::new(&["normal", "glaucoma"]);

    let err = classifier.predict(&fundus_image(32)).unwrap_err();

    assert!(matches!(err, ClassifierError::Inference(_)));
}

#[test]
fn test_random_classifier_keeps_invariants() {
    let logger = Arc::new(LoggerConsole::new(
        chrono::FixedOffset::east_opt(0).unwrap(),
    ));
    let classifier = ImageClassifierRandom::new(logger);
    let image = fundus_image(32);

    for _ in 0..20 {
        let prediction = classifier.predict(&image).unwrap();
        prediction.validate(classifier.vocabulary()).unwrap();
    }
}
