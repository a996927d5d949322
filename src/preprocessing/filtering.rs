//! # Image Filtering Module
//!
//! Noise reduction ahead of binarization. A small median window removes
//! salt-and-pepper speckles from screenshots without smearing glyph edges the
//! way a Gaussian blur does.

use image::GrayImage;
use imageproc::filter::median_filter;
use tracing;

use super::types::{DenoisedImageResult, PreprocessingError};

/// Largest accepted median radius (a 11x11 window)
pub const MAX_MEDIAN_RADIUS: u32 = 5;

/// Applies a square median filter of the given radius.
///
/// # Arguments
///
/// * `image` - The grayscale image to denoise
/// * `radius` - Half window size; `1` gives the classic 3x3 median
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use screenshot_analyzer::preprocessing::reduce_noise;
///
/// let mut img = GrayImage::from_pixel(5, 5, Luma([0]));
/// img.put_pixel(2, 2, Luma([255]));
/// let denoised = reduce_noise(&img, 1).unwrap();
/// assert_eq!(denoised.image.get_pixel(2, 2)[0], 0);
/// ```
pub fn reduce_noise(
    image: &GrayImage,
    radius: u32,
) -> Result<DenoisedImageResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    if image.width() == 0 || image.height() == 0 {
        return Err(PreprocessingError::EmptyImage);
    }
    if radius == 0 || radius > MAX_MEDIAN_RADIUS {
        return Err(PreprocessingError::InvalidParameter {
            name: "median_radius",
            value: radius,
        });
    }

    let filtered = median_filter(image, radius, radius);
    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "ocr_preprocessing",
        "Median denoising completed in {}ms: radius={}, dimensions={}x{}",
        processing_time.as_millis(),
        radius,
        filtered.width(),
        filtered.height()
    );

    Ok(DenoisedImageResult {
        image: filtered,
        radius,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}
