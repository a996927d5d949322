//! # Shared Types for Image Preprocessing
//!
//! Result and error types shared by the preprocessing sub-modules.

use image::GrayImage;

/// Errors that can occur during image preprocessing operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    /// Image has no pixels to process
    EmptyImage,
    /// Filter parameter outside its supported range
    InvalidParameter { name: &'static str, value: u32 },
}

impl std::fmt::Display for PreprocessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessingError::EmptyImage => write!(f, "Image has no pixels to preprocess"),
            PreprocessingError::InvalidParameter { name, value } => {
                write!(f, "Invalid preprocessing parameter {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for PreprocessingError {}

/// Result of a median denoising pass.
#[derive(Debug, Clone)]
pub struct DenoisedImageResult {
    /// The denoised grayscale image
    pub image: GrayImage,
    /// Kernel radius (1 => 3x3 window)
    pub radius: u32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of image thresholding operation.
#[derive(Debug, Clone)]
pub struct ThresholdedImageResult {
    /// The thresholded binary image (only 0 and 255)
    pub image: GrayImage,
    /// Optimal threshold value found by Otsu's method
    pub threshold: u8,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Outcome of the full grayscale -> denoise -> binarize chain.
#[derive(Debug, Clone)]
pub struct BinarizedImage {
    pub image: GrayImage,
    pub threshold: u8,
    pub processing_time_ms: u32,
}
