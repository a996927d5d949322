//! # Regional Analysis Module
//!
//! Splits a screenshot into four quadrants plus a central crop and reports
//! the brightness of each. The center zone overlaps every quadrant.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color_analysis::channel_statistics;
use crate::errors::{AppError, AppResult};
use crate::image_source::RasterImage;

/// Smallest width and height for which every zone is non-empty
pub const MIN_REGION_DIMENSION: u32 = 2;

/// Fixed spatial zones of a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Zone::TopLeft,
        Zone::TopRight,
        Zone::BottomLeft,
        Zone::BottomRight,
        Zone::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::TopLeft => "top_left",
            Zone::TopRight => "top_right",
            Zone::BottomLeft => "bottom_left",
            Zone::BottomRight => "bottom_right",
            Zone::Center => "center",
        }
    }

    /// Crop bounds `(x0, y0, x1, y1)` of this zone, upper bounds exclusive
    pub fn bounds(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let (half_w, half_h) = (width / 2, height / 2);
        match self {
            Zone::TopLeft => (0, 0, half_w, half_h),
            Zone::TopRight => (half_w, 0, width, half_h),
            Zone::BottomLeft => (0, half_h, half_w, height),
            Zone::BottomRight => (half_w, half_h, width, height),
            Zone::Center => (width / 4, height / 4, 3 * width / 4, 3 * height / 4),
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Brightness of one zone, derived from its per-channel RGB means
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBrightness {
    /// Average of the three channel means
    pub mean_brightness: f64,
    /// Population variance of the three channel means
    pub brightness_variance: f64,
}

/// Per-zone brightness, always holding every [`Zone`] in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionStats {
    zones: IndexMap<Zone, ZoneBrightness>,
}

impl RegionStats {
    pub fn get(&self, zone: Zone) -> Option<&ZoneBrightness> {
        self.zones.get(&zone)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Zone, &ZoneBrightness)> {
        self.zones.iter()
    }
}

/// Compute brightness statistics for the five fixed zones.
///
/// # Errors
///
/// `AppError::Analysis` if the image is smaller than 2x2, since the quadrant
/// split would produce empty zones.
pub fn analyze_regions(image: &RasterImage) -> AppResult<RegionStats> {
    let (width, height) = image.dimensions();
    if width < MIN_REGION_DIMENSION || height < MIN_REGION_DIMENSION {
        return Err(AppError::Analysis(format!(
            "regional analysis needs at least {0}x{0} pixels, image is {1}x{2}",
            MIN_REGION_DIMENSION, width, height
        )));
    }

    let mut zones = IndexMap::with_capacity(Zone::ALL.len());
    for zone in Zone::ALL {
        let (x0, y0, x1, y1) = zone.bounds(width, height);
        let crop = image.crop(x0, y0, x1, y1)?;
        let (means, _) = channel_statistics(&crop.to_rgb8());

        let mean_brightness = means.iter().sum::<f64>() / 3.0;
        let brightness_variance = means
            .iter()
            .map(|m| (m - mean_brightness).powi(2))
            .sum::<f64>()
            / 3.0;

        debug!(
            zone = zone.as_str(),
            mean_brightness, brightness_variance, "Zone analyzed"
        );
        zones.insert(
            zone,
            ZoneBrightness {
                mean_brightness,
                brightness_variance,
            },
        );
    }

    Ok(RegionStats { zones })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn image_from(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_fn(
            width,
            height,
            |x, y| Rgb(f(x, y)),
        )))
    }

    #[test]
    fn test_zone_bounds_use_integer_division() {
        assert_eq!(Zone::TopLeft.bounds(5, 3), (0, 0, 2, 1));
        assert_eq!(Zone::TopRight.bounds(5, 3), (2, 0, 5, 1));
        assert_eq!(Zone::BottomLeft.bounds(5, 3), (0, 1, 2, 3));
        assert_eq!(Zone::BottomRight.bounds(5, 3), (2, 1, 5, 3));
        assert_eq!(Zone::Center.bounds(8, 4), (2, 1, 6, 3));
    }

    #[test]
    fn test_every_zone_present_for_minimum_size() {
        for (w, h) in [(2, 2), (2, 7), (3, 2), (17, 11)] {
            let stats = analyze_regions(&image_from(w, h, |_, _| [10, 20, 30])).unwrap();
            assert_eq!(stats.len(), 5, "{w}x{h}");
            for zone in Zone::ALL {
                assert!(stats.get(zone).is_some());
            }
        }
    }

    #[test]
    fn test_quadrant_brightness() {
        // Left half white, right half pure red
        let image = image_from(4, 4, |x, _| if x < 2 { [255, 255, 255] } else { [255, 0, 0] });
        let stats = analyze_regions(&image).unwrap();

        let top_left = stats.get(Zone::TopLeft).unwrap();
        assert_eq!(top_left.mean_brightness, 255.0);
        assert_eq!(top_left.brightness_variance, 0.0);

        let top_right = stats.get(Zone::TopRight).unwrap();
        assert_eq!(top_right.mean_brightness, 85.0);
        assert!((top_right.brightness_variance - 14450.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_small_image() {
        let err = analyze_regions(&image_from(1, 5, |_, _| [0, 0, 0])).unwrap_err();
        assert!(matches!(err, AppError::Analysis(_)));
    }

    #[test]
    fn test_serializes_with_zone_names() {
        let stats = analyze_regions(&image_from(2, 2, |_, _| [0, 0, 0])).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert!(json.get("bottom_right").is_some());
        assert!(json.get("center").is_some());
    }
}
