//! # OCR Processing Module
//!
//! Multi-strategy text extraction from screenshots.
//!
//! Every image goes through three kinds of strategies:
//!
//! - `original`: the untouched image with the default page segmentation mode
//! - `preprocessed`: grayscale, median denoise and Otsu binarization first
//! - `psm_<mode>`: a sweep over layout-specific page segmentation modes
//!
//! The two base strategies are always recorded, failures included, so a
//! report shows why OCR produced nothing. Sweep results are only kept when
//! they carry more than a few characters; failed sweep modes are skipped.
//!
//! The engine itself is synchronous. Each strategy runs on a blocking worker
//! of a private tokio runtime and is bounded by the configured timeout. A
//! worker that times out is abandoned, not cancelled, so it may keep its
//! Tesseract instance locked; [`TesseractBackend`] then swaps in a fresh
//! instance instead of queueing behind the stale call.

use image::DynamicImage;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{error_logging, AppError, AppResult};
use crate::image_source::RasterImage;
use crate::observability;
use crate::preprocessing;

pub use crate::ocr_config::{OcrConfig, PageSegMode, RecoveryConfig};
pub use crate::ocr_errors::OcrError;

/// Result key of the strategy run on the untouched image
pub const ORIGINAL_STRATEGY: &str = "original";
/// Result key of the strategy run on the binarized image
pub const PREPROCESSED_STRATEGY: &str = "preprocessed";

/// A text recognition engine the extraction strategies can be run against
pub trait OcrBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Check that the engine can be used at all.
    ///
    /// Called once per extraction; an error here aborts the whole extraction
    /// instead of being recorded per strategy.
    fn ensure_available(&self) -> Result<(), OcrError>;

    /// Recognize the text of `image` assuming the layout described by `mode`
    fn recognize(&self, image: &DynamicImage, mode: PageSegMode) -> Result<String, OcrError>;
}

/// Tesseract backend built on `leptess`
///
/// Requires the `tesseract` cargo feature. Without it every call reports
/// [`OcrError::EngineUnavailable`].
pub struct TesseractBackend {
    languages: String,
    tessdata_path: Option<std::path::PathBuf>,
    #[cfg(feature = "tesseract")]
    instances: crate::instance_manager::OcrInstanceManager,
}

impl TesseractBackend {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            languages: config.languages.clone(),
            tessdata_path: config.tessdata_path.clone(),
            #[cfg(feature = "tesseract")]
            instances: crate::instance_manager::OcrInstanceManager::new(),
        }
    }

    /// A configured tessdata directory must exist before Tesseract is touched
    fn check_tessdata(&self) -> Result<(), OcrError> {
        match &self.tessdata_path {
            Some(path) if !path.is_dir() => Err(OcrError::EngineUnavailable(format!(
                "tessdata_path {} is not a directory",
                path.display()
            ))),
            _ => Ok(()),
        }
    }

    #[cfg(feature = "tesseract")]
    fn instance(&self) -> Result<Arc<parking_lot::Mutex<leptess::LepTess>>, OcrError> {
        self.instances
            .get_instance(&self.languages, self.tessdata_path.as_deref())
            .map_err(|e| OcrError::EngineUnavailable(e.to_string()))
    }

    /// Cached instance, replaced when a timed-out worker still holds its lock
    #[cfg(feature = "tesseract")]
    fn idle_instance(&self) -> Result<Arc<parking_lot::Mutex<leptess::LepTess>>, OcrError> {
        let instance = self.instance()?;
        if !instance.is_locked() {
            return Ok(instance);
        }

        warn!(
            languages = %self.languages,
            "Tesseract instance still busy with an abandoned call, creating a fresh one"
        );
        self.instances
            .remove_instance(&self.languages, self.tessdata_path.as_deref());
        self.instance()
    }
}

#[cfg(feature = "tesseract")]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn ensure_available(&self) -> Result<(), OcrError> {
        self.check_tessdata()?;
        self.instance().map(|_| ())
    }

    fn recognize(&self, image: &DynamicImage, mode: PageSegMode) -> Result<String, OcrError> {
        let png = encode_png(image)?;
        let instance = self.idle_instance()?;
        let mut tess = instance.lock();

        tess.set_variable(leptess::Variable::TesseditPagesegMode, mode.as_str())
            .map_err(|e| OcrError::Extraction(format!("Failed to set PSM mode: {}", e)))?;
        tess.set_image_from_mem(&png).map_err(|e| {
            OcrError::ImageEncoding(format!("Failed to load image for OCR: {:?}", e))
        })?;

        tess.get_utf8_text().map_err(|e| {
            OcrError::Extraction(format!("Failed to extract text from image: {}", e))
        })
    }
}

#[cfg(not(feature = "tesseract"))]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn ensure_available(&self) -> Result<(), OcrError> {
        self.check_tessdata()?;
        Err(OcrError::EngineUnavailable(format!(
            "built without the `tesseract` feature (languages: {}, tessdata: {:?})",
            self.languages, self.tessdata_path
        )))
    }

    fn recognize(&self, _image: &DynamicImage, _mode: PageSegMode) -> Result<String, OcrError> {
        Err(self
            .ensure_available()
            .err()
            .unwrap_or_else(|| OcrError::EngineUnavailable("tesseract".to_string())))
    }
}

/// Encode an image as PNG for handing to an OCR engine
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    let encodable = match image {
        // PNG has no floating point sample format
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
        _ => image.clone(),
    };
    encodable
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| OcrError::ImageEncoding(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// What a single strategy produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    /// Recognition succeeded; text is trimmed and may be empty
    Extracted { text: String },
    /// Recognition failed; the error is kept for diagnostics
    Failed { error: String },
}

impl StrategyOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            StrategyOutcome::Extracted { text } => Some(text),
            StrategyOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StrategyOutcome::Failed { .. })
    }
}

impl From<Result<String, OcrError>> for StrategyOutcome {
    fn from(result: Result<String, OcrError>) -> Self {
        match result {
            Ok(text) => StrategyOutcome::Extracted { text },
            Err(e) => StrategyOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Strategy label -> outcome, in the order the strategies ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OcrResult {
    strategies: IndexMap<String, StrategyOutcome>,
}

impl OcrResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, strategy: impl Into<String>, outcome: StrategyOutcome) {
        self.strategies.insert(strategy.into(), outcome);
    }

    pub fn get(&self, strategy: &str) -> Option<&StrategyOutcome> {
        self.strategies.get(strategy)
    }

    pub fn contains_key(&self, strategy: &str) -> bool {
        self.strategies.contains_key(strategy)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StrategyOutcome)> {
        self.strategies.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Successfully extracted texts with their strategy labels
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter_map(|(label, outcome)| outcome.text().map(|text| (label, text)))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl FromIterator<(String, StrategyOutcome)> for OcrResult {
    fn from_iter<I: IntoIterator<Item = (String, StrategyOutcome)>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

/// Runs the OCR strategies against one backend
pub struct OcrExtractionEngine {
    backend: Arc<dyn OcrBackend>,
    config: OcrConfig,
    runtime: Option<tokio::runtime::Runtime>,
}

impl OcrExtractionEngine {
    /// Build an engine around `backend`.
    ///
    /// Must not be called from inside a tokio runtime; extraction blocks the
    /// calling thread.
    ///
    /// # Errors
    ///
    /// `AppError::Config` when the configuration is invalid, `AppError::Internal`
    /// when the timeout runtime cannot be created.
    pub fn new(backend: Arc<dyn OcrBackend>, config: OcrConfig) -> AppResult<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .thread_name("ocr-worker")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build OCR runtime: {}", e)))?;

        info!(
            backend = backend.name(),
            languages = %config.languages,
            timeout_secs = config.recovery.operation_timeout_secs,
            sweep_modes = config.sweep_modes.len(),
            "OCR extraction engine created"
        );

        Ok(Self {
            backend,
            config,
            runtime: Some(runtime),
        })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run every strategy against `image`.
    ///
    /// # Errors
    ///
    /// `AppError::EngineUnavailable` when the backend cannot be used. Any
    /// per-strategy failure is recorded in (or left out of) the result.
    pub fn extract(&self, image: &RasterImage) -> AppResult<OcrResult> {
        let span = observability::ocr_span("extract");
        let _guard = span.enter();
        let start_time = Instant::now();

        if let Err(e) = self.backend.ensure_available() {
            error_logging::log_ocr_error(&e, "availability_check", Some(start_time.elapsed()));
            observability::record_ocr_metrics(false, start_time.elapsed(), image.pixel_count());
            return Err(match e {
                OcrError::EngineUnavailable(msg) => AppError::EngineUnavailable(msg),
                other => AppError::EngineUnavailable(other.to_string()),
            });
        }

        let mut result = OcrResult::new();
        let original = image.shared_pixels();

        let outcome = self.run_strategy(ORIGINAL_STRATEGY, Arc::clone(&original), self.config.psm_mode);
        result.insert(ORIGINAL_STRATEGY, outcome.into());

        let outcome = match preprocessing::binarize(image, self.config.median_radius) {
            Ok(binarized) => {
                debug!(
                    threshold = binarized.threshold,
                    processing_time_ms = binarized.processing_time_ms,
                    "Image binarized for OCR"
                );
                self.run_strategy(
                    PREPROCESSED_STRATEGY,
                    Arc::new(DynamicImage::ImageLuma8(binarized.image)),
                    self.config.psm_mode,
                )
            }
            Err(e) => {
                let e = OcrError::from(e);
                error_logging::log_ocr_error(&e, PREPROCESSED_STRATEGY, None);
                Err(e)
            }
        };
        result.insert(PREPROCESSED_STRATEGY, outcome.into());

        for mode in &self.config.sweep_modes {
            let key = mode.strategy_key();
            match self.run_strategy(&key, Arc::clone(&original), *mode) {
                Ok(text) if text.chars().count() > self.config.min_sweep_chars => {
                    result.insert(key, StrategyOutcome::Extracted { text });
                }
                Ok(text) => {
                    debug!(
                        strategy = %key,
                        chars = text.chars().count(),
                        "Discarding short page segmentation result"
                    );
                }
                Err(e) => {
                    debug!(strategy = %key, error = %e, "Skipping failed page segmentation mode");
                }
            }
        }

        let duration = start_time.elapsed();
        observability::record_ocr_metrics(true, duration, image.pixel_count());
        info!(
            strategies = result.len(),
            duration_ms = duration.as_millis() as u64,
            "OCR extraction completed"
        );

        Ok(result)
    }

    /// Run one recognition call on a blocking worker, bounded by the timeout
    fn run_strategy(
        &self,
        strategy: &str,
        image: Arc<DynamicImage>,
        mode: PageSegMode,
    ) -> Result<String, OcrError> {
        let start_time = Instant::now();
        let timeout = self.config.recovery.operation_timeout();

        let result = match &self.runtime {
            Some(runtime) => {
                let backend = Arc::clone(&self.backend);
                let joined = runtime.block_on(async move {
                    tokio::time::timeout(
                        timeout,
                        tokio::task::spawn_blocking(move || backend.recognize(&image, mode)),
                    )
                    .await
                });
                match joined {
                    Ok(Ok(recognized)) => recognized.map(|text| text.trim().to_string()),
                    Ok(Err(join_error)) => Err(OcrError::Extraction(format!(
                        "OCR worker terminated: {}",
                        join_error
                    ))),
                    Err(_) => Err(OcrError::Timeout(format!(
                        "{} did not finish within {} seconds",
                        strategy,
                        timeout.as_secs()
                    ))),
                }
            }
            None => Err(OcrError::Extraction("OCR runtime is shut down".to_string())),
        };

        let duration = start_time.elapsed();
        match &result {
            Ok(text) => {
                observability::record_ocr_strategy_metrics(strategy, "extracted", duration);
                debug!(
                    strategy = strategy,
                    psm = mode.as_str(),
                    chars = text.chars().count(),
                    duration_ms = duration.as_millis() as u64,
                    "OCR strategy completed"
                );
            }
            Err(e) => {
                let outcome = if matches!(e, OcrError::Timeout(_)) {
                    "timeout"
                } else {
                    "failed"
                };
                observability::record_ocr_strategy_metrics(strategy, outcome, duration);
                warn!(
                    strategy = strategy,
                    psm = mode.as_str(),
                    error = %e,
                    duration_ms = duration.as_millis() as u64,
                    "OCR strategy failed"
                );
            }
        }

        result
    }
}

impl Drop for OcrExtractionEngine {
    fn drop(&mut self) {
        // Timed-out workers may still be running; do not wait for them
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
