//! # Content Classifier Module
//!
//! Deterministic threshold rules turning brightness, contrast and background
//! signals into human-readable guesses about the screenshot's content.
//!
//! Rules are evaluated in a fixed order and every rule that fires appends its
//! hypothesis, so the output order is stable across calls.

use serde::{Deserialize, Serialize};

use crate::color_analysis::{BackgroundSignal, BrightnessStats, ContrastSignal};
use crate::errors::{AppError, AppResult};

pub const LIGHT_THEME_MIN_BRIGHTNESS: f64 = 200.0;
pub const DARK_THEME_MAX_BRIGHTNESS: f64 = 80.0;
pub const HIGH_CONTRAST_MIN_RATIO: f64 = 0.4;
pub const LOW_CONTRAST_MAX_RATIO: f64 = 0.2;
pub const UNIFORM_BACKGROUND_MIN_FRACTION: f64 = 0.7;

/// Cut-off values used by [`classify_with`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Mean brightness above which the theme is light
    pub light_theme_min_brightness: f64,
    /// Mean brightness below which the theme is dark
    pub dark_theme_max_brightness: f64,
    pub high_contrast_min_ratio: f64,
    pub low_contrast_max_ratio: f64,
    pub uniform_background_min_fraction: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            light_theme_min_brightness: LIGHT_THEME_MIN_BRIGHTNESS,
            dark_theme_max_brightness: DARK_THEME_MAX_BRIGHTNESS,
            high_contrast_min_ratio: HIGH_CONTRAST_MIN_RATIO,
            low_contrast_max_ratio: LOW_CONTRAST_MAX_RATIO,
            uniform_background_min_fraction: UNIFORM_BACKGROUND_MIN_FRACTION,
        }
    }
}

impl ClassifierThresholds {
    /// Validate that the thresholds describe non-overlapping bands
    pub fn validate(&self) -> AppResult<()> {
        if self.dark_theme_max_brightness > self.light_theme_min_brightness {
            return Err(AppError::Config(format!(
                "dark_theme_max_brightness ({}) must not exceed light_theme_min_brightness ({})",
                self.dark_theme_max_brightness, self.light_theme_min_brightness
            )));
        }
        if self.low_contrast_max_ratio > self.high_contrast_min_ratio {
            return Err(AppError::Config(format!(
                "low_contrast_max_ratio ({}) must not exceed high_contrast_min_ratio ({})",
                self.low_contrast_max_ratio, self.high_contrast_min_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.uniform_background_min_fraction) {
            return Err(AppError::Config(format!(
                "uniform_background_min_fraction ({}) must be within 0.0-1.0",
                self.uniform_background_min_fraction
            )));
        }
        Ok(())
    }
}

/// A content guess emitted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentHypothesis {
    #[serde(rename = "light theme")]
    LightTheme,
    #[serde(rename = "dark theme")]
    DarkTheme,
    #[serde(rename = "mixed theme")]
    MixedTheme,
    #[serde(rename = "high contrast: text/UI likely")]
    HighContrast,
    #[serde(rename = "low contrast: simple interface or image")]
    LowContrast,
    #[serde(rename = "uniform background: likely clean interface")]
    UniformBackground,
}

impl ContentHypothesis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentHypothesis::LightTheme => "light theme",
            ContentHypothesis::DarkTheme => "dark theme",
            ContentHypothesis::MixedTheme => "mixed theme",
            ContentHypothesis::HighContrast => "high contrast: text/UI likely",
            ContentHypothesis::LowContrast => "low contrast: simple interface or image",
            ContentHypothesis::UniformBackground => "uniform background: likely clean interface",
        }
    }
}

impl std::fmt::Display for ContentHypothesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify with the default thresholds
pub fn classify(
    brightness: &BrightnessStats,
    contrast: &ContrastSignal,
    background: &BackgroundSignal,
) -> Vec<ContentHypothesis> {
    classify_with(&ClassifierThresholds::default(), brightness, contrast, background)
}

/// Apply the theme, contrast and background rules in that order.
///
/// Exactly one theme hypothesis is always produced. Contrast ratios inside
/// the `[low, high]` band and background fractions at or below the cut-off
/// produce nothing.
pub fn classify_with(
    thresholds: &ClassifierThresholds,
    brightness: &BrightnessStats,
    contrast: &ContrastSignal,
    background: &BackgroundSignal,
) -> Vec<ContentHypothesis> {
    let mut hypotheses = Vec::with_capacity(3);

    if brightness.mean > thresholds.light_theme_min_brightness {
        hypotheses.push(ContentHypothesis::LightTheme);
    } else if brightness.mean < thresholds.dark_theme_max_brightness {
        hypotheses.push(ContentHypothesis::DarkTheme);
    } else {
        hypotheses.push(ContentHypothesis::MixedTheme);
    }

    if contrast.contrast_ratio > thresholds.high_contrast_min_ratio {
        hypotheses.push(ContentHypothesis::HighContrast);
    } else if contrast.contrast_ratio < thresholds.low_contrast_max_ratio {
        hypotheses.push(ContentHypothesis::LowContrast);
    }

    if background.fraction > thresholds.uniform_background_min_fraction {
        hypotheses.push(ContentHypothesis::UniformBackground);
    }

    hypotheses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(mean: f64, ratio: f64, fraction: f64) -> (BrightnessStats, ContrastSignal, BackgroundSignal) {
        (
            BrightnessStats {
                mean,
                std: 0.0,
                min: 0,
                max: 255,
            },
            ContrastSignal {
                contrast_ratio: ratio,
                high_contrast: ratio > crate::color_analysis::HIGH_CONTRAST_THRESHOLD,
            },
            BackgroundSignal {
                intensity: 0,
                fraction,
            },
        )
    }

    #[test]
    fn test_solid_black_image() {
        let (b, c, bg) = signals(0.0, 0.0, 1.0);
        assert_eq!(
            classify(&b, &c, &bg),
            vec![
                ContentHypothesis::DarkTheme,
                ContentHypothesis::LowContrast,
                ContentHypothesis::UniformBackground
            ]
        );
    }

    #[test]
    fn test_uniform_mid_gray() {
        let (b, c, bg) = signals(128.0, 0.0, 1.0);
        let hypotheses: Vec<&str> = classify(&b, &c, &bg).iter().map(|h| h.as_str()).collect();
        assert_eq!(
            hypotheses,
            vec![
                "mixed theme",
                "low contrast: simple interface or image",
                "uniform background: likely clean interface"
            ]
        );
    }

    #[test]
    fn test_light_busy_screenshot() {
        let (b, c, bg) = signals(230.5, 0.55, 0.45);
        assert_eq!(
            classify(&b, &c, &bg),
            vec![ContentHypothesis::LightTheme, ContentHypothesis::HighContrast]
        );
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        // Exactly on every cut-off: only the fallback theme fires
        let (b, c, bg) = signals(200.0, 0.4, 0.7);
        assert_eq!(classify(&b, &c, &bg), vec![ContentHypothesis::MixedTheme]);

        let (b, c, bg) = signals(80.0, 0.2, 0.0);
        assert_eq!(classify(&b, &c, &bg), vec![ContentHypothesis::MixedTheme]);
    }

    #[test]
    fn test_idempotent() {
        let (b, c, bg) = signals(42.0, 0.31, 0.9);
        assert_eq!(classify(&b, &c, &bg), classify(&b, &c, &bg));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = ClassifierThresholds {
            light_theme_min_brightness: 120.0,
            ..ClassifierThresholds::default()
        };
        let (b, c, bg) = signals(128.0, 0.3, 0.1);
        assert_eq!(
            classify_with(&thresholds, &b, &c, &bg),
            vec![ContentHypothesis::LightTheme]
        );
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(ClassifierThresholds::default().validate().is_ok());

        let inverted = ClassifierThresholds {
            low_contrast_max_ratio: 0.5,
            ..ClassifierThresholds::default()
        };
        assert!(matches!(inverted.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_serializes_as_display_string() {
        let json = serde_json::to_string(&ContentHypothesis::HighContrast).unwrap();
        assert_eq!(json, "\"high contrast: text/UI likely\"");
    }
}
