#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub onnx_model_path: String,
    /// Newline separated class names, in the order of the model's output.
    pub vocabulary_path: String,
    /// (height, width)
    pub input_shape: (u32, u32),
}
