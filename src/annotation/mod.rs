pub mod knowledge;

use crate::chart::interface::{Bar, ChartError, ChartRenderer, ChartSpec};
use crate::image_classifier::interface::Prediction;

pub const CHART_TITLE: &str = "Prediction Probability (Normal vs Glaucoma)";
pub const CHART_Y_LABEL: &str = "Probability";

/// Classes always shown in the chart, in bar order, with their bar colors.
pub const DISPLAY_CLASSES: [(&str, [u8; 3]); 2] = [
    ("normal", [0, 128, 0]),
    ("glaucoma", [255, 0, 0]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub knowledge: &'static str,
    pub chart_png: Vec<u8>,
}

/// Probability of `class` by exact name. The first match wins on duplicate
/// vocabulary entries, and an absent class reads as 0.0.
pub fn probability_of(vocabulary: &[String], probabilities: &[f32], class: &str) -> f32 {
    match vocabulary.iter().position(|name| name == class) {
        Some(index) => probabilities.get(index).copied().unwrap_or(0.0),
        None => 0.0,
    }
}

pub fn display_chart(vocabulary: &[String], prediction: &Prediction) -> ChartSpec {
    let bars = DISPLAY_CLASSES
        .iter()
        .map(|(class, color)| Bar {
            label: class.to_string(),
            value: probability_of(vocabulary, &prediction.probabilities, class),
            color: *color,
        })
        .collect();

    ChartSpec {
        title: CHART_TITLE.to_string(),
        y_label: CHART_Y_LABEL.to_string(),
        y_range: (0.0, 1.0),
        bars,
    }
}

pub fn annotate(
    vocabulary: &[String],
    prediction: &Prediction,
    renderer: &dyn ChartRenderer,
) -> Result<Annotation, ChartError> {
    let knowledge = knowledge::knowledge_for(&prediction.label);
    let chart_png = renderer.render(&display_chart(vocabulary, prediction))?;

    Ok(Annotation {
        knowledge,
        chart_png,
    })
}
