use crate::image_classifier::models::model_config::ModelConfig;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub model: ModelConfig,
    pub body_limit_bytes: usize,
    pub logger_timezone: chrono::FixedOffset,
    pub use_fake_classifier: bool,
    pub chart_font_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model: ModelConfig {
                onnx_model_path: "model/export.onnx".to_string(),
                vocabulary_path: "model/vocab.txt".to_string(),
                input_shape: (224, 224),
            },
            body_limit_bytes: 10 * 1024 * 1024,
            logger_timezone: utc(),
            use_fake_classifier: false,
            chart_font_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays `FUNDUS_*` variables resolved through `lookup` onto the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("FUNDUS_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("FUNDUS_PORT") {
            config.port = parse_number("FUNDUS_PORT", &port)?;
        }
        if let Some(path) = lookup("FUNDUS_MODEL_PATH") {
            config.model.onnx_model_path = path;
        }
        if let Some(path) = lookup("FUNDUS_VOCAB_PATH") {
            config.model.vocabulary_path = path;
        }
        if let Some(size) = lookup("FUNDUS_INPUT_SIZE") {
            config.model.input_shape = parse_input_size(&size)?;
        }
        if let Some(limit) = lookup("FUNDUS_BODY_LIMIT") {
            config.body_limit_bytes = parse_number("FUNDUS_BODY_LIMIT", &limit)?;
        }
        if let Some(offset) = lookup("FUNDUS_LOG_UTC_OFFSET") {
            config.logger_timezone = parse_utc_offset(&offset)?;
        }
        if let Some(flag) = lookup("FUNDUS_FAKE_CLASSIFIER") {
            config.use_fake_classifier = parse_flag("FUNDUS_FAKE_CLASSIFIER", &flag)?;
        }
        if let Some(path) = lookup("FUNDUS_CHART_FONT") {
            config.chart_font_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn utc() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(0).expect("zero offset is in range")
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| invalid(key, value, e))
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, value, "expected a boolean")),
    }
}

/// Parses `WIDTHxHEIGHT` into the `(height, width)` order used by `ModelConfig`.
fn parse_input_size(value: &str) -> Result<(u32, u32), ConfigError> {
    let key = "FUNDUS_INPUT_SIZE";
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| invalid(key, value, "expected WIDTHxHEIGHT"))?;
    let width: u32 = parse_number(key, width)?;
    let height: u32 = parse_number(key, height)?;
    if width == 0 || height == 0 {
        return Err(invalid(key, value, "dimensions must be positive"));
    }
    Ok((height, width))
}

fn parse_utc_offset(value: &str) -> Result<chrono::FixedOffset, ConfigError> {
    let key = "FUNDUS_LOG_UTC_OFFSET";
    let hours: i32 = parse_number(key, value)?;
    hours
        .checked_mul(3600)
        .and_then(chrono::FixedOffset::east_opt)
        .ok_or_else(|| invalid(key, value, "offset out of range"))
}
