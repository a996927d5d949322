//! # Color & Brightness Analysis Module
//!
//! Aggregate color statistics, a ranked color histogram and grayscale
//! brightness/contrast/background signals for a screenshot.

use image::{GrayImage, RgbImage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::image_source::RasterImage;

/// Number of ranked colors kept after sorting the histogram
pub const DOMINANT_COLORS_COMPUTED: usize = 10;
/// Number of ranked colors surfaced in `ColorStats`
pub const DOMINANT_COLORS_REPORTED: usize = 5;
/// A pixel counts as contrasting when it deviates from the mean by more than this many standard deviations
pub const CONTRAST_DEVIATION_FACTOR: f64 = 0.5;
/// `ContrastSignal::high_contrast` is set above this ratio
pub const HIGH_CONTRAST_THRESHOLD: f64 = 0.3;

/// One entry of the ranked color histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorCount {
    pub count: u64,
    pub rgb: [u8; 3],
    /// Share of all pixels in the image (0.0-1.0)
    pub fraction: f64,
}

/// Per-channel statistics and dominant colors of an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStats {
    pub mean_rgb: [f64; 3],
    pub stddev_rgb: [f64; 3],
    /// Most frequent colors, descending by count
    pub dominant_colors: Vec<ColorCount>,
    /// Number of distinct RGB triples present
    pub total_colors: usize,
}

/// Grayscale intensity statistics (0-255 domain)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrightnessStats {
    pub mean: f64,
    pub std: f64,
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastSignal {
    /// Fraction of pixels deviating from the mean by more than half a standard deviation
    pub contrast_ratio: f64,
    pub high_contrast: bool,
}

/// Most frequent grayscale intensity, taken to be the background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSignal {
    pub intensity: u8,
    pub fraction: f64,
}

/// Compute per-channel mean/stddev and the dominant colors of an image.
///
/// Non-RGB input is converted to RGB first. The histogram is ranked in full,
/// truncated to [`DOMINANT_COLORS_COMPUTED`] entries and then only the first
/// [`DOMINANT_COLORS_REPORTED`] are kept in the result.
///
/// # Errors
///
/// `AppError::Analysis` if the image has no pixels.
pub fn analyze_color(image: &RasterImage) -> AppResult<ColorStats> {
    ensure_not_empty(image, "color analysis")?;

    let rgb = image.to_rgb8();
    let (mean_rgb, stddev_rgb) = channel_statistics(&rgb);

    let mut ranked = rank_colors(&rgb);
    let total_colors = ranked.len();
    ranked.truncate(DOMINANT_COLORS_COMPUTED);
    ranked.truncate(DOMINANT_COLORS_REPORTED);

    debug!(
        total_colors,
        mean_r = mean_rgb[0],
        mean_g = mean_rgb[1],
        mean_b = mean_rgb[2],
        "Color analysis completed"
    );

    Ok(ColorStats {
        mean_rgb,
        stddev_rgb,
        dominant_colors: ranked,
        total_colors,
    })
}

/// Full color histogram ranked descending by count.
///
/// Colors are counted in row-major encounter order and the sort is stable, so
/// ties keep the color that appeared first.
pub fn rank_colors(rgb: &RgbImage) -> Vec<ColorCount> {
    let total = f64::from(rgb.width()) * f64::from(rgb.height());

    let mut counts: IndexMap<[u8; 3], u64> = IndexMap::new();
    for pixel in rgb.pixels() {
        *counts.entry(pixel.0).or_insert(0) += 1;
    }

    let mut ranked: Vec<ColorCount> = counts
        .into_iter()
        .map(|(rgb, count)| ColorCount {
            count,
            rgb,
            fraction: if total > 0.0 { count as f64 / total } else { 0.0 },
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Compute grayscale brightness statistics together with the contrast and
/// background signals.
///
/// A single pass over the pixels builds a 256-bin histogram; every statistic
/// is then derived from the histogram.
///
/// # Errors
///
/// `AppError::Analysis` if the image has no pixels.
pub fn analyze_brightness(
    image: &RasterImage,
) -> AppResult<(BrightnessStats, ContrastSignal, BackgroundSignal)> {
    ensure_not_empty(image, "brightness analysis")?;

    let gray = image.to_luma8();
    let histogram = intensity_histogram(&gray);
    let total = f64::from(gray.width()) * f64::from(gray.height());

    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    for (value, &count) in histogram.iter().enumerate() {
        let value = value as f64;
        let count = count as f64;
        sum += value * count;
        sum_sq += value * value * count;
    }
    let mean = sum / total;
    let std = (sum_sq / total - mean * mean).max(0.0).sqrt();

    // Histogram is non-empty, so both searches find a bin
    let min = histogram.iter().position(|&c| c > 0).unwrap_or(0) as u8;
    let max = histogram.iter().rposition(|&c| c > 0).unwrap_or(0) as u8;

    let deviation_threshold = std * CONTRAST_DEVIATION_FACTOR;
    let mut contrasting = 0u64;
    let mut background_intensity = 0usize;
    for (value, &count) in histogram.iter().enumerate() {
        if (value as f64 - mean).abs() > deviation_threshold {
            contrasting += count;
        }
        // Strict comparison keeps the lowest intensity on ties
        if count > histogram[background_intensity] {
            background_intensity = value;
        }
    }

    let contrast_ratio = contrasting as f64 / total;
    let background_fraction = histogram[background_intensity] as f64 / total;

    debug!(
        mean,
        std,
        min,
        max,
        contrast_ratio,
        background_intensity,
        background_fraction,
        "Brightness analysis completed"
    );

    Ok((
        BrightnessStats { mean, std, min, max },
        ContrastSignal {
            contrast_ratio,
            high_contrast: contrast_ratio > HIGH_CONTRAST_THRESHOLD,
        },
        BackgroundSignal {
            intensity: background_intensity as u8,
            fraction: background_fraction,
        },
    ))
}

/// Flat per-channel mean and population standard deviation
pub(crate) fn channel_statistics(rgb: &RgbImage) -> ([f64; 3], [f64; 3]) {
    let mut sums = [0u64; 3];
    let mut sums_sq = [0u64; 3];
    for pixel in rgb.pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            let value = u64::from(value);
            sums[channel] += value;
            sums_sq[channel] += value * value;
        }
    }

    let n = f64::from(rgb.width()) * f64::from(rgb.height());
    let mut means = [0f64; 3];
    let mut stddevs = [0f64; 3];
    if n == 0.0 {
        return (means, stddevs);
    }
    for channel in 0..3 {
        let mean = sums[channel] as f64 / n;
        let variance = (sums_sq[channel] as f64 / n - mean * mean).max(0.0);
        means[channel] = mean;
        stddevs[channel] = variance.sqrt();
    }
    (means, stddevs)
}

fn intensity_histogram(gray: &GrayImage) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }
    histogram
}

fn ensure_not_empty(image: &RasterImage, stage: &str) -> AppResult<()> {
    if image.pixel_count() == 0 {
        return Err(AppError::Analysis(format!(
            "{stage} requires at least one pixel (image is {}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
