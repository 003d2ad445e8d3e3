#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart rendering failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub y_label: String,
    pub y_range: (f32, f32),
    pub bars: Vec<Bar>,
}

/// Turns a bar chart description into PNG bytes.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartSpec) -> Result<Vec<u8>, ChartError>;
}
