use chart::impl_raster::ChartRendererRaster;
use config::Config;
use image_classifier::impl_random::ImageClassifierRandom;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use image_classifier::interface::ImageClassifier;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use pipeline::PredictionPipeline;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod annotation;
mod chart;
mod config;
mod image_classifier;
mod image_decoder;
mod library;
mod pipeline;
mod server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let logger: Arc<dyn Logger> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let classifier: Arc<dyn ImageClassifier> = if config.use_fake_classifier {
        logger.warn("Serving random predictions, no model is loaded");
        Arc::new(ImageClassifierRandom::new(logger.clone()))
    } else {
        Arc::new(ImageClassifierTractOnnx::new(
            config.model.clone(),
            logger.clone(),
        )?)
    };

    let chart_logger = logger.with_namespace("chart");
    let chart_renderer = match &config.chart_font_path {
        Some(path) => ChartRendererRaster::with_font_path(path)?,
        None => ChartRendererRaster::with_system_font(chart_logger.as_ref()),
    };

    let pipeline = Arc::new(PredictionPipeline::new(
        classifier,
        Arc::new(chart_renderer),
        logger.clone(),
    ));

    let app = server::routes::router(pipeline, config.body_limit_bytes);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    logger.info(&format!("Listening on http://{}", listener.local_addr()?));

    axum::serve(listener, app).await?;

    Ok(())
}
