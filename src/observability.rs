//! Observability module for tracing setup, spans and metrics.
//!
//! Metrics go through the `metrics` facade. Without an installed recorder
//! they are no-ops, so library users choose their own exporter.

use anyhow::Result;
use tracing_subscriber::prelude::*;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize structured logging with tracing and configuration
///
/// `RUST_LOG` directives take precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!("screenshot_analyzer={}", config.level))
    })?;

    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    tracing::info!(
        log_level = %config.level,
        log_format = ?config.format,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span covering the analysis of one image
pub fn analysis_span(image: &str) -> tracing::Span {
    tracing::info_span!("screenshot_analysis", image = image, component = "analyzer")
}

/// Create a span for OCR operations
pub fn ocr_span(operation: &str) -> tracing::Span {
    tracing::info_span!("ocr_operation", operation = operation, component = "ocr")
}

/// Record the outcome of one OCR strategy
pub fn record_ocr_strategy_metrics(strategy: &str, outcome: &'static str, duration: std::time::Duration) {
    let strategy = strategy.to_string();
    metrics::counter!("ocr_strategies_total", "strategy" => strategy.clone(), "result" => outcome)
        .increment(1);
    metrics::histogram!("ocr_strategy_duration_seconds", "strategy" => strategy)
        .record(duration.as_secs_f64());
}

/// Record a completed whole-image extraction
pub fn record_ocr_metrics(success: bool, duration: std::time::Duration, pixel_count: u64) {
    metrics::counter!("ocr_operations_total", "result" => if success { "success" } else { "failure" }).increment(1);
    metrics::histogram!("ocr_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("ocr_image_pixels").record(pixel_count as f64);
}

/// Record a completed screenshot analysis
pub fn record_analysis_metrics(success: bool, duration: std::time::Duration) {
    metrics::counter!("screenshot_analyses_total", "result" => if success { "success" } else { "failure" }).increment(1);
    metrics::histogram!("screenshot_analysis_duration_seconds").record(duration.as_secs_f64());
}

/// Record error rate metrics
pub fn record_error_metrics(error_type: &str, component: &str) {
    let error_type = error_type.to_string();
    let component = component.to_string();
    metrics::counter!("errors_total", "type" => error_type, "component" => component).increment(1);
}
