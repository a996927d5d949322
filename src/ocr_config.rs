//! # OCR Configuration Module
//!
//! This module defines configuration structures for OCR processing,
//! including the page segmentation sweep, timeout settings and
//! preprocessing parameters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

// Constants for OCR configuration
pub const DEFAULT_LANGUAGES: &str = "eng";
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;
/// Sweep results at or below this many trimmed characters are discarded
pub const DEFAULT_MIN_SWEEP_CHARS: usize = 10;
pub const DEFAULT_MEDIAN_RADIUS: u32 = 1;

/// Timeout configuration applied to each OCR strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Timeout for a single OCR strategy in seconds
    pub operation_timeout_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

impl RecoveryConfig {
    /// Validate recovery configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.operation_timeout_secs == 0 {
            return Err(AppError::Config(
                "operation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn operation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.operation_timeout_secs)
    }
}

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageSegMode {
    /// Orientation and script detection (OSD) only
    OsdOnly = 0,
    /// Automatic page segmentation with OSD
    AutoOsd = 1,
    /// Automatic page segmentation, no OSD
    AutoNoOsd = 2,
    /// Fully automatic page segmentation
    #[default]
    Auto = 3,
    /// Assume a single column of text
    SingleColumn = 4,
    /// Assume a single uniform block of vertically aligned text
    SingleBlockVert = 5,
    /// Assume a single uniform block of text
    SingleBlock = 6,
    /// Treat the image as a single text line
    SingleLine = 7,
    /// Treat the image as a single word
    SingleWord = 8,
    /// Treat the image as a single word in a circle
    WordInCircle = 9,
    /// Treat the image as a single character
    SingleChar = 10,
    /// Find as much text as possible in no particular order
    SparseText = 11,
    /// Sparse text with OSD
    SparseTextOsd = 12,
    /// Treat the image as a single text line, bypassing hacks that are Tesseract-specific
    RawLine = 13,
}

impl PageSegMode {
    /// Convert PSM mode to string value for Tesseract
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSegMode::OsdOnly => "0",
            PageSegMode::AutoOsd => "1",
            PageSegMode::AutoNoOsd => "2",
            PageSegMode::Auto => "3",
            PageSegMode::SingleColumn => "4",
            PageSegMode::SingleBlockVert => "5",
            PageSegMode::SingleBlock => "6",
            PageSegMode::SingleLine => "7",
            PageSegMode::SingleWord => "8",
            PageSegMode::WordInCircle => "9",
            PageSegMode::SingleChar => "10",
            PageSegMode::SparseText => "11",
            PageSegMode::SparseTextOsd => "12",
            PageSegMode::RawLine => "13",
        }
    }

    /// Result key used for this mode in a page segmentation sweep, e.g. `psm_6`
    pub fn strategy_key(&self) -> String {
        format!("psm_{}", self.as_str())
    }
}

/// Configuration structure for OCR processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// OCR language codes (e.g., "eng", "eng+fra", "deu")
    pub languages: String,
    /// Explicit tessdata directory; `None` lets Tesseract use its compiled-in default
    pub tessdata_path: Option<PathBuf>,
    /// Page segmentation mode for the `original` and `preprocessed` strategies
    pub psm_mode: PageSegMode,
    /// Modes tried on the original image after the two base strategies, in order
    pub sweep_modes: Vec<PageSegMode>,
    /// A sweep result is kept only when its trimmed text is longer than this
    pub min_sweep_chars: usize,
    /// Median filter radius for the `preprocessed` strategy (1 => 3x3)
    pub median_radius: u32,
    /// Timeout settings
    pub recovery: RecoveryConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            tessdata_path: None,
            psm_mode: PageSegMode::default(),
            sweep_modes: vec![
                PageSegMode::SingleBlock,
                PageSegMode::SingleLine,
                PageSegMode::SingleWord,
                PageSegMode::RawLine,
            ],
            min_sweep_chars: DEFAULT_MIN_SWEEP_CHARS,
            median_radius: DEFAULT_MEDIAN_RADIUS,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl OcrConfig {
    /// Validate OCR configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.languages.trim().is_empty() {
            return Err(AppError::Config("languages cannot be empty".to_string()));
        }

        if self.median_radius == 0
            || self.median_radius > crate::preprocessing::filtering::MAX_MEDIAN_RADIUS
        {
            return Err(AppError::Config(format!(
                "median_radius ({}) must be between 1 and {}",
                self.median_radius,
                crate::preprocessing::filtering::MAX_MEDIAN_RADIUS
            )));
        }

        // Duplicate modes would collide on the same result key
        for (i, mode) in self.sweep_modes.iter().enumerate() {
            if self.sweep_modes[..i].contains(mode) {
                return Err(AppError::Config(format!(
                    "sweep_modes contains psm {} more than once",
                    mode.as_str()
                )));
            }
        }

        self.recovery.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OcrConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.languages, "eng");
        assert_eq!(config.psm_mode, PageSegMode::Auto);
        assert_eq!(config.min_sweep_chars, 10);
        assert_eq!(config.recovery.operation_timeout_secs, 30);
    }

    #[test]
    fn test_default_sweep_keys() {
        let keys: Vec<String> = OcrConfig::default()
            .sweep_modes
            .iter()
            .map(PageSegMode::strategy_key)
            .collect();
        assert_eq!(keys, vec!["psm_6", "psm_7", "psm_8", "psm_13"]);
    }

    #[test]
    #[allow(unused_assignments)]
    fn test_ocr_config_validation() {
        let mut config = OcrConfig::default();

        config.languages = "  ".to_string();
        assert!(config.validate().is_err());
        config.languages = "eng".to_string();

        config.median_radius = 9;
        assert!(config.validate().is_err());
        config.median_radius = 0;
        assert!(config.validate().is_err());
        config.median_radius = 1;

        config.sweep_modes = vec![PageSegMode::SingleLine, PageSegMode::SingleLine];
        assert!(config.validate().is_err());
        config.sweep_modes.clear();
        assert!(config.validate().is_ok());

        config.recovery.operation_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_tessdata_directory_left_to_backend() {
        // Backend availability is decided at extraction time
        let config = OcrConfig {
            tessdata_path: Some(PathBuf::from("/definitely/not/a/tessdata/dir")),
            ..OcrConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_seg_mode_values() {
        assert_eq!(PageSegMode::Auto.as_str(), "3");
        assert_eq!(PageSegMode::RawLine.as_str(), "13");
        assert_eq!(PageSegMode::SingleWord as i32, 8);
    }
}
