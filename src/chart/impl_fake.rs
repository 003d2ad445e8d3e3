use crate::chart::interface::{ChartError, ChartRenderer, ChartSpec};
use std::sync::Mutex;

pub const FAKE_CHART_BYTES: &[u8] = b"\x89PNG-fake-chart";

/// Returns fixed bytes and remembers every chart it was asked to draw.
#[derive(Default)]
pub struct ChartRendererFake {
    rendered: Mutex<Vec<ChartSpec>>,
}

impl ChartRendererFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> Vec<ChartSpec> {
        self.rendered
            .lock()
            .map(|charts| charts.clone())
            .unwrap_or_default()
    }
}

impl ChartRenderer for ChartRendererFake {
    fn render(&self, chart: &ChartSpec) -> Result<Vec<u8>, ChartError> {
        if let Ok(mut charts) = self.rendered.lock() {
            charts.push(chart.clone());
        }
        Ok(FAKE_CHART_BYTES.to_vec())
    }
}

pub struct ChartRendererFailing;

impl ChartRenderer for ChartRendererFailing {
    fn render(&self, _chart: &ChartSpec) -> Result<Vec<u8>, ChartError> {
        Err(ChartError::Render("out of memory".to_string()))
    }
}
