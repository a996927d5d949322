//! # Image Thresholding Module
//!
//! Binary thresholding for OCR preprocessing, using Otsu's method for
//! automatic global threshold selection.

use image::{GrayImage, Luma};
use tracing;

use super::types::{PreprocessingError, ThresholdedImageResult};

/// Applies Otsu's thresholding algorithm to convert an image to binary (black/white).
///
/// The threshold maximizes the between-class variance of the intensity
/// histogram. Pixels strictly brighter than the threshold become 255, all
/// others 0.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use screenshot_analyzer::preprocessing::apply_otsu_threshold;
///
/// let img = GrayImage::from_fn(10, 2, |x, _| Luma([if x < 5 { 30 } else { 220 }]));
/// let result = apply_otsu_threshold(&img).unwrap();
/// assert!(result.threshold >= 30 && result.threshold < 220);
/// ```
pub fn apply_otsu_threshold(
    gray: &GrayImage,
) -> Result<ThresholdedImageResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    if gray.width() == 0 || gray.height() == 0 {
        return Err(PreprocessingError::EmptyImage);
    }

    // Calculate histogram
    let mut histogram = [0u32; 256];
    let total_pixels = f64::from(gray.width()) * f64::from(gray.height());

    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let optimal_threshold = find_otsu_threshold(&histogram, total_pixels);

    let mut binary_img = GrayImage::new(gray.width(), gray.height());
    for (src, dst) in gray.pixels().zip(binary_img.pixels_mut()) {
        *dst = if src[0] > optimal_threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        };
    }

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "ocr_preprocessing",
        "Otsu thresholding completed in {}ms: threshold={}, dimensions={}x{}",
        processing_time.as_millis(),
        optimal_threshold,
        gray.width(),
        gray.height()
    );

    Ok(ThresholdedImageResult {
        image: binary_img,
        threshold: optimal_threshold,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// Finds the optimal threshold using Otsu's method by maximizing between-class variance.
///
/// Returns 0 when no split separates two non-empty classes, so a uniform
/// image turns white unless it is already black.
fn find_otsu_threshold(histogram: &[u32; 256], total_pixels: f64) -> u8 {
    // Pre-calculate cumulative statistics
    let mut cumulative_sums = [0f64; 256];
    let mut cumulative_weighted_sums = [0f64; 256];
    let mut cumulative_sum = 0f64;
    let mut cumulative_weighted_sum = 0f64;

    for (i, &count) in histogram.iter().enumerate() {
        let pixel_count = f64::from(count);
        cumulative_sum += pixel_count;
        cumulative_weighted_sum += (i as f64) * pixel_count;

        cumulative_sums[i] = cumulative_sum;
        cumulative_weighted_sums[i] = cumulative_weighted_sum;
    }

    let mut max_variance = 0f64;
    let mut optimal_threshold = 0u8;

    let total_weighted_sum = cumulative_weighted_sums[255];

    for threshold in 0..255usize {
        // Weight of background class (pixels <= threshold)
        let w0 = cumulative_sums[threshold] / total_pixels;
        // Weight of foreground class (pixels > threshold)
        let w1 = 1.0 - w0;

        if w0 == 0.0 || w1 <= 0.0 {
            continue;
        }

        let mu0 = cumulative_weighted_sums[threshold] / cumulative_sums[threshold];
        let mu1 = (total_weighted_sum - cumulative_weighted_sums[threshold])
            / (total_pixels - cumulative_sums[threshold]);

        let variance = w0 * w1 * (mu0 - mu1).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_otsu_threshold_simple_image() {
        // Two distinct regions
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 25 } else { 225 }]));

        let result = apply_otsu_threshold(&img)
            .expect("apply_otsu_threshold should succeed with valid grayscale image");

        assert!(result.threshold >= 25 && result.threshold < 225);

        for (x, _, pixel) in result.image.enumerate_pixels() {
            let expected = if x < 5 { 0 } else { 255 };
            assert_eq!(pixel[0], expected);
        }
    }

    #[test]
    fn test_apply_otsu_threshold_uniform_image() {
        let img = GrayImage::from_pixel(10, 10, Luma([128]));

        let result = apply_otsu_threshold(&img)
            .expect("apply_otsu_threshold should succeed with uniform grayscale image");

        assert_eq!(result.threshold, 0);
        assert!(result.image.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_apply_otsu_threshold_flat_images() {
        for (level, expected) in [(1u8, 255u8), (40, 255), (200, 255), (0, 0)] {
            let img = GrayImage::from_pixel(6, 4, Luma([level]));
            let result = apply_otsu_threshold(&img).unwrap();
            assert_eq!(result.threshold, 0);
            assert!(
                result.image.pixels().all(|p| p[0] == expected),
                "level {level}"
            );
        }
    }

    #[test]
    fn test_find_otsu_threshold_basic() {
        let mut histogram = [0u32; 256];
        histogram[25] = 5000;
        histogram[225] = 5000;

        let threshold = find_otsu_threshold(&histogram, 10000.0);
        assert!((25..225).contains(&threshold));
    }

    #[test]
    fn test_find_otsu_threshold_skewed_classes() {
        let mut histogram = [0u32; 256];
        histogram[10] = 9000;
        histogram[200] = 1000;

        let threshold = find_otsu_threshold(&histogram, 10000.0);
        assert!((10..200).contains(&threshold));
    }

    #[test]
    fn test_empty_image_rejected() {
        assert_eq!(
            apply_otsu_threshold(&GrayImage::new(0, 3)).unwrap_err(),
            PreprocessingError::EmptyImage
        );
    }
}
