//! # Result Aggregator Module
//!
//! Filters OCR output down to usable text, matches it against a keyword
//! vocabulary and assembles the final [`ContentReport`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::ContentHypothesis;
use crate::color_analysis::{BackgroundSignal, BrightnessStats, ColorStats, ContrastSignal};
use crate::image_source::{PixelMode, RasterImage};
use crate::ocr::{OcrResult, StrategyOutcome};
use crate::regions::RegionStats;

/// UI-related terms searched for in extracted text
pub const KEYWORD_VOCABULARY: [&str; 9] = [
    "error", "warning", "success", "button", "click", "input", "form", "api", "data",
];

/// Number of leading lines shown in a [`TextSummary`] preview
pub const PREVIEW_LINES: usize = 10;

pub const WIDE_LAYOUT_MIN_ASPECT: f64 = 1.5;
pub const PORTRAIT_LAYOUT_MAX_ASPECT: f64 = 0.8;

/// Drop failed and empty strategies, then match the vocabulary against the rest.
///
/// Matching is a case-insensitive substring search over the concatenation of
/// all retained texts. Matched terms are returned lowercased.
pub fn aggregate(ocr: &OcrResult, vocabulary: &[&str]) -> (OcrResult, BTreeSet<String>) {
    let retained: OcrResult = ocr
        .texts()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(label, text)| {
            (
                label.to_string(),
                StrategyOutcome::Extracted {
                    text: text.to_string(),
                },
            )
        })
        .collect();

    let haystack = retained
        .texts()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase();

    let keywords = vocabulary
        .iter()
        .map(|term| term.to_lowercase())
        .filter(|term| !term.is_empty() && haystack.contains(term.as_str()))
        .collect();

    (retained, keywords)
}

/// A numbered line of a text preview (1-based position in the original text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewLine {
    pub number: usize,
    pub text: String,
}

/// Size and preview of one strategy's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub char_count: usize,
    pub line_count: usize,
    /// Non-blank lines among the first [`PREVIEW_LINES`], trimmed
    pub preview: Vec<PreviewLine>,
    /// Lines after the preview window
    pub remaining_lines: usize,
}

pub fn summarize_text(text: &str) -> TextSummary {
    let lines: Vec<&str> = text.lines().collect();
    let preview = lines
        .iter()
        .take(PREVIEW_LINES)
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| PreviewLine {
            number: i + 1,
            text: line.trim().to_string(),
        })
        .collect();

    TextSummary {
        char_count: text.chars().count(),
        line_count: lines.len(),
        preview,
        remaining_lines: lines.len().saturating_sub(PREVIEW_LINES),
    }
}

/// Rough screen orientation derived from the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutHint {
    #[serde(rename = "wide screen/landscape view")]
    Wide,
    #[serde(rename = "portrait/mobile view")]
    Portrait,
    #[serde(rename = "standard screen view")]
    Standard,
}

impl LayoutHint {
    pub fn from_aspect_ratio(aspect_ratio: f64) -> Self {
        if aspect_ratio > WIDE_LAYOUT_MIN_ASPECT {
            LayoutHint::Wide
        } else if aspect_ratio < PORTRAIT_LAYOUT_MAX_ASPECT {
            LayoutHint::Portrait
        } else {
            LayoutHint::Standard
        }
    }
}

/// Where the analyzed image came from and its basic geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: Option<String>,
    pub path: Option<String>,
    pub file_size_bytes: Option<u64>,
    /// Size in MiB rounded to two decimals
    pub file_size_mb: Option<f64>,
    pub format: Option<String>,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub pixel_mode: PixelMode,
}

impl FileMetadata {
    pub fn from_image(image: &RasterImage) -> Self {
        let source = image.source();
        let (width, height) = image.dimensions();
        let aspect_ratio = if height == 0 {
            0.0
        } else {
            f64::from(width) / f64::from(height)
        };

        Self {
            file_name: source
                .path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned()),
            path: source.path.as_ref().map(|p| p.display().to_string()),
            file_size_bytes: source.file_size_bytes,
            file_size_mb: source
                .file_size_bytes
                .map(|bytes| (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0),
            format: source
                .format
                .map(|format| format!("{:?}", format).to_uppercase()),
            width,
            height,
            aspect_ratio,
            pixel_mode: image.pixel_mode(),
        }
    }

    pub fn layout_hint(&self) -> LayoutHint {
        LayoutHint::from_aspect_ratio(self.aspect_ratio)
    }
}

/// Upstream outputs combined into a [`ContentReport`]
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub file: FileMetadata,
    pub color: ColorStats,
    pub brightness: BrightnessStats,
    pub contrast: ContrastSignal,
    pub background: BackgroundSignal,
    pub regions: RegionStats,
    pub hypotheses: Vec<ContentHypothesis>,
    /// `None` when OCR was disabled or the engine is unavailable
    pub ocr: Option<OcrResult>,
    pub analyzed_at: DateTime<Utc>,
}

/// Everything known about one screenshot. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentReport {
    file: FileMetadata,
    layout: LayoutHint,
    color: ColorStats,
    brightness: BrightnessStats,
    contrast: ContrastSignal,
    background: BackgroundSignal,
    regions: RegionStats,
    hypotheses: Vec<ContentHypothesis>,
    ocr: Option<OcrResult>,
    extracted_text: OcrResult,
    text_summaries: IndexMap<String, TextSummary>,
    keywords: BTreeSet<String>,
    analyzed_at: DateTime<Utc>,
}

impl ContentReport {
    /// Combine analyzer outputs with the aggregated OCR text
    pub fn assemble(inputs: ReportInputs, vocabulary: &[&str]) -> Self {
        let (extracted_text, keywords) = match &inputs.ocr {
            Some(ocr) => aggregate(ocr, vocabulary),
            None => (OcrResult::new(), BTreeSet::new()),
        };

        let text_summaries = extracted_text
            .texts()
            .map(|(label, text)| (label.to_string(), summarize_text(text)))
            .collect();

        Self {
            layout: inputs.file.layout_hint(),
            file: inputs.file,
            color: inputs.color,
            brightness: inputs.brightness,
            contrast: inputs.contrast,
            background: inputs.background,
            regions: inputs.regions,
            hypotheses: inputs.hypotheses,
            ocr: inputs.ocr,
            extracted_text,
            text_summaries,
            keywords,
            analyzed_at: inputs.analyzed_at,
        }
    }

    pub fn file(&self) -> &FileMetadata {
        &self.file
    }

    pub fn layout(&self) -> LayoutHint {
        self.layout
    }

    pub fn color(&self) -> &ColorStats {
        &self.color
    }

    pub fn brightness(&self) -> &BrightnessStats {
        &self.brightness
    }

    pub fn contrast(&self) -> &ContrastSignal {
        &self.contrast
    }

    pub fn background(&self) -> &BackgroundSignal {
        &self.background
    }

    pub fn regions(&self) -> &RegionStats {
        &self.regions
    }

    pub fn hypotheses(&self) -> &[ContentHypothesis] {
        &self.hypotheses
    }

    /// Raw OCR output including failed strategies
    pub fn ocr(&self) -> Option<&OcrResult> {
        self.ocr.as_ref()
    }

    /// OCR strategies that produced non-empty text
    pub fn extracted_text(&self) -> &OcrResult {
        &self.extracted_text
    }

    pub fn text_summaries(&self) -> &IndexMap<String, TextSummary> {
        &self.text_summaries
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }
}
