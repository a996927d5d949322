//! # Screenshot Analyzer
//!
//! Runs one screenshot through every analysis stage and assembles the
//! [`ContentReport`]. Each image is processed independently; nothing is
//! carried over between calls apart from the OCR engine's cached backend.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::aggregator::{ContentReport, FileMetadata, ReportInputs, KEYWORD_VOCABULARY};
use crate::classifier::{classify_with, ClassifierThresholds};
use crate::color_analysis::{analyze_brightness, analyze_color};
use crate::config::AppConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::image_source::RasterImage;
use crate::observability;
use crate::ocr::{OcrBackend, OcrExtractionEngine, OcrResult, TesseractBackend};
use crate::ocr_config::OcrConfig;
use crate::regions::analyze_regions;

/// End-to-end analysis of single screenshots
pub struct ScreenshotAnalyzer {
    ocr: Option<OcrExtractionEngine>,
    thresholds: ClassifierThresholds,
}

impl ScreenshotAnalyzer {
    /// Build an analyzer from application configuration, using Tesseract for OCR
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        if !config.ocr_enabled {
            info!("OCR disabled by configuration");
            return Ok(Self::without_ocr(config.classifier.clone()));
        }

        let backend = Arc::new(TesseractBackend::new(&config.ocr));
        Self::with_backend(backend, config.ocr.clone(), config.classifier.clone())
    }

    /// Build an analyzer around any OCR backend
    pub fn with_backend(
        backend: Arc<dyn OcrBackend>,
        ocr_config: OcrConfig,
        thresholds: ClassifierThresholds,
    ) -> AppResult<Self> {
        Ok(Self {
            ocr: Some(OcrExtractionEngine::new(backend, ocr_config)?),
            thresholds,
        })
    }

    /// Build an analyzer that only computes visual statistics
    pub fn without_ocr(thresholds: ClassifierThresholds) -> Self {
        Self {
            ocr: None,
            thresholds,
        }
    }

    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    /// Load and analyze an image file
    ///
    /// # Errors
    ///
    /// `AppError::ImageLoad` when the file cannot be decoded, plus everything
    /// [`ScreenshotAnalyzer::analyze_image`] can return.
    pub fn analyze_path(&self, path: impl AsRef<Path>) -> AppResult<ContentReport> {
        let image = RasterImage::load(path)?;
        self.analyze_image(&image)
    }

    /// Analyze an already decoded image
    ///
    /// # Errors
    ///
    /// `AppError::Analysis` for images smaller than 2x2. An unavailable OCR
    /// engine is not an error: the report then carries no OCR output.
    pub fn analyze_image(&self, image: &RasterImage) -> AppResult<ContentReport> {
        let label = image
            .source()
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        let span = observability::analysis_span(&label);
        let _guard = span.enter();
        let start_time = Instant::now();

        let result = self.run_pipeline(image);

        let duration = start_time.elapsed();
        observability::record_analysis_metrics(result.is_ok(), duration);
        match &result {
            Ok(report) => info!(
                image = %label,
                hypotheses = report.hypotheses().len(),
                keywords = report.keywords().len(),
                duration_ms = duration.as_millis() as u64,
                "Screenshot analyzed"
            ),
            Err(e) => {
                observability::record_error_metrics("analysis", "analyzer");
                error_logging::log_analysis_error(e, "pipeline", Some(image.dimensions()));
            }
        }

        result
    }

    fn run_pipeline(&self, image: &RasterImage) -> AppResult<ContentReport> {
        let color = analyze_color(image)?;
        let (brightness, contrast, background) = analyze_brightness(image)?;
        let regions = analyze_regions(image)?;
        let hypotheses = classify_with(&self.thresholds, &brightness, &contrast, &background);
        let ocr = self.extract_text(image)?;

        Ok(ContentReport::assemble(
            ReportInputs {
                file: FileMetadata::from_image(image),
                color,
                brightness,
                contrast,
                background,
                regions,
                hypotheses,
                ocr,
                analyzed_at: Utc::now(),
            },
            &KEYWORD_VOCABULARY,
        ))
    }

    /// OCR output, or `None` when OCR is disabled or the engine is unavailable
    fn extract_text(&self, image: &RasterImage) -> AppResult<Option<OcrResult>> {
        let Some(engine) = &self.ocr else {
            return Ok(None);
        };

        match engine.extract(image) {
            Ok(result) => Ok(Some(result)),
            Err(AppError::EngineUnavailable(msg)) => {
                warn!(
                    backend = engine.backend_name(),
                    reason = %msg,
                    "OCR engine unavailable, reporting visual analysis only"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
