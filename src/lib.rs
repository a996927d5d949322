//! # Screenshot Analyzer
//!
//! Inspects raster screenshots and reports color, brightness and regional
//! statistics, heuristic content hypotheses and text extracted through
//! several OCR strategies.

pub mod aggregator;
pub mod analyzer;
pub mod classifier;
pub mod color_analysis;
pub mod config;
pub mod errors;
pub mod image_source;
#[cfg(feature = "tesseract")]
pub mod instance_manager;
pub mod observability;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod preprocessing;
pub mod regions;

// Re-export types for easier access
pub use aggregator::ContentReport;
pub use analyzer::ScreenshotAnalyzer;
pub use errors::{AppError, AppResult};
pub use image_source::RasterImage;
pub use ocr::{OcrBackend, OcrExtractionEngine, OcrResult, StrategyOutcome};
