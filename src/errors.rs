//! # Application Error Types
//!
//! This module defines the error taxonomy shared by every analysis stage.
//! Each variant is fatal for the image being analyzed only; batch drivers are
//! expected to log it and move on to the next image.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Missing, unreadable or undecodable image
    ImageLoad(String),
    /// Crop bounds outside the image or degenerate (x1 <= x0 or y1 <= y0)
    InvalidRegion {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },
    /// Degenerate image (zero or too few pixels for the requested analysis)
    Analysis(String),
    /// OCR backend missing or misconfigured
    EngineUnavailable(String),
    /// Configuration validation errors
    Config(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ImageLoad(msg) => write!(f, "[IMAGE_LOAD] {}", msg),
            AppError::InvalidRegion {
                x0,
                y0,
                x1,
                y1,
                width,
                height,
            } => write!(
                f,
                "[INVALID_REGION] crop ({}, {}) -> ({}, {}) is not a valid region of a {}x{} image",
                x0, y0, x1, y1, width, height
            ),
            AppError::Analysis(msg) => write!(f, "[ANALYSIS] {}", msg),
            AppError::EngineUnavailable(msg) => write!(f, "[OCR_UNAVAILABLE] {}", msg),
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::ImageLoad(err.to_string())
    }
}

impl From<crate::ocr_errors::OcrError> for AppError {
    fn from(err: crate::ocr_errors::OcrError) -> Self {
        match err {
            crate::ocr_errors::OcrError::EngineUnavailable(msg) => AppError::EngineUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the crate
pub mod error_logging {
    use tracing::error;

    /// Log image loading errors with path and size context
    pub fn log_image_error(
        error: &impl std::fmt::Display,
        operation: &str,
        path: Option<&str>,
        file_size: Option<u64>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            path = ?path,
            file_size_bytes = ?file_size,
            "Image loading failed"
        );
    }

    /// Log analysis errors with the image dimensions that caused them
    pub fn log_analysis_error(
        error: &impl std::fmt::Display,
        stage: &str,
        dimensions: Option<(u32, u32)>,
    ) {
        error!(
            error = %error,
            stage = %stage,
            dimensions = ?dimensions,
            "Image analysis failed"
        );
    }

    /// Log OCR processing errors with strategy and timing context
    pub fn log_ocr_error(
        error: &impl std::fmt::Display,
        strategy: &str,
        processing_duration: Option<std::time::Duration>,
    ) {
        error!(
            error = %error,
            strategy = %strategy,
            processing_duration_ms = ?processing_duration.map(|d| d.as_millis()),
            "OCR processing failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
