//! # Image Preprocessing Module
//!
//! Prepares the `preprocessed` OCR strategy input: grayscale conversion,
//! median denoising and Otsu binarization into a pure black/white image.
//!
//! - `filtering`: median noise reduction
//! - `thresholding`: binary thresholding using Otsu's method
//! - `types`: shared types and error definitions

pub mod filtering;
pub mod thresholding;
pub mod types;

pub use filtering::reduce_noise;
pub use thresholding::apply_otsu_threshold;
pub use types::{BinarizedImage, DenoisedImageResult, PreprocessingError, ThresholdedImageResult};

use crate::image_source::RasterImage;

/// Run the full grayscale -> median denoise -> Otsu chain on an image
pub fn binarize(image: &RasterImage, median_radius: u32) -> Result<BinarizedImage, PreprocessingError> {
    let gray = image.to_luma8();
    let denoised = reduce_noise(&gray, median_radius)?;
    let thresholded = apply_otsu_threshold(&denoised.image)?;

    Ok(BinarizedImage {
        image: thresholded.image,
        threshold: thresholded.threshold,
        processing_time_ms: denoised.processing_time_ms + thresholded.processing_time_ms,
    })
}
