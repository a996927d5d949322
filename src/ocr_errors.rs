//! # OCR Error Types Module
//!
//! Errors raised while running a single OCR strategy. Apart from
//! `EngineUnavailable`, these are recovered inside the extraction engine and
//! never abort a whole extraction.

/// Custom error types for OCR operations
#[derive(Debug, Clone, PartialEq)]
pub enum OcrError {
    /// OCR backend missing, uninitializable or misconfigured
    EngineUnavailable(String),
    /// Image could not be handed to the backend
    ImageEncoding(String),
    /// Denoise/binarization step failed
    Preprocessing(String),
    /// Text extraction errors
    Extraction(String),
    /// Timeout errors
    Timeout(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::EngineUnavailable(msg) => {
                write!(f, "[OCR_INIT] OCR engine is not available: {}", msg)
            }
            OcrError::ImageEncoding(msg) => {
                write!(f, "[IMAGE_ENCODE] Failed to prepare image for OCR: {}", msg)
            }
            OcrError::Preprocessing(msg) => {
                write!(f, "[OCR_PREPROCESS] Image preprocessing failed: {}", msg)
            }
            OcrError::Extraction(msg) => {
                write!(f, "[OCR_EXTRACT] Text extraction from image failed: {}", msg)
            }
            OcrError::Timeout(msg) => write!(f, "[OCR_TIMEOUT] OCR processing timed out: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}

impl From<crate::preprocessing::PreprocessingError> for OcrError {
    fn from(err: crate::preprocessing::PreprocessingError) -> Self {
        OcrError::Preprocessing(err.to_string())
    }
}
