//! # Image Source Module
//!
//! Loads raster screenshots from disk or memory and exposes derived views
//! (RGB, grayscale, crops) without ever touching the decoded buffer.
//!
//! ## Supported Formats
//!
//! Anything the `image` crate can decode; screenshots are usually PNG.
//! Palette ("indexed") images are expanded to RGB(A) by the decoder.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ColorType, DynamicImage, GrayImage, ImageFormat, ImageReader, Luma, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{error_logging, AppError, AppResult};

/// Pixel layout of the decoded buffer, named after the usual image-library mode strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelMode {
    #[serde(rename = "L")]
    Luma,
    #[serde(rename = "LA")]
    LumaAlpha,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "I;16")]
    Luma16,
    #[serde(rename = "LA;16")]
    LumaAlpha16,
    #[serde(rename = "RGB;16")]
    Rgb16,
    #[serde(rename = "RGBA;16")]
    Rgba16,
    #[serde(rename = "RGBF")]
    Rgb32F,
    #[serde(rename = "RGBAF")]
    Rgba32F,
    #[serde(rename = "other")]
    Other,
}

impl PixelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelMode::Luma => "L",
            PixelMode::LumaAlpha => "LA",
            PixelMode::Rgb => "RGB",
            PixelMode::Rgba => "RGBA",
            PixelMode::Luma16 => "I;16",
            PixelMode::LumaAlpha16 => "LA;16",
            PixelMode::Rgb16 => "RGB;16",
            PixelMode::Rgba16 => "RGBA;16",
            PixelMode::Rgb32F => "RGBF",
            PixelMode::Rgba32F => "RGBAF",
            PixelMode::Other => "other",
        }
    }

    fn from_color_type(color: ColorType) -> Self {
        match color {
            ColorType::L8 => PixelMode::Luma,
            ColorType::La8 => PixelMode::LumaAlpha,
            ColorType::Rgb8 => PixelMode::Rgb,
            ColorType::Rgba8 => PixelMode::Rgba,
            ColorType::L16 => PixelMode::Luma16,
            ColorType::La16 => PixelMode::LumaAlpha16,
            ColorType::Rgb16 => PixelMode::Rgb16,
            ColorType::Rgba16 => PixelMode::Rgba16,
            ColorType::Rgb32F => PixelMode::Rgb32F,
            ColorType::Rgba32F => PixelMode::Rgba32F,
            _ => PixelMode::Other,
        }
    }
}

impl std::fmt::Display for PixelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an image came from. Derived views inherit nothing: they carry an empty `SourceInfo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub path: Option<PathBuf>,
    pub format: Option<ImageFormat>,
    pub file_size_bytes: Option<u64>,
}

/// An immutable decoded raster.
///
/// The pixel buffer is shared behind an `Arc` so OCR workers can borrow it
/// without copying; every transformation returns a new `RasterImage` that owns
/// a fresh buffer.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: Arc<DynamicImage>,
    source: SourceInfo,
}

impl RasterImage {
    /// Decode an image file.
    ///
    /// # Errors
    ///
    /// `AppError::ImageLoad` if the path does not exist, is not a regular file,
    /// is empty, cannot be read, or is not a decodable raster.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let path_label = path.display().to_string();

        let file_size = validate_image_path(path).inspect_err(|e| {
            error_logging::log_image_error(e, "validate_image_path", Some(&path_label), None)
        })?;

        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| AppError::ImageLoad(format!("cannot open {path_label}: {e}")))?;
        let format = reader.format();

        let decoded = reader.decode().map_err(|e| {
            error_logging::log_image_error(&e, "decode_image", Some(&path_label), Some(file_size));
            AppError::ImageLoad(format!("cannot decode {path_label}: {e}"))
        })?;

        info!(
            path = %path_label,
            width = decoded.width(),
            height = decoded.height(),
            format = ?format,
            file_size_bytes = file_size,
            "Loaded image"
        );

        Ok(Self {
            pixels: Arc::new(decoded),
            source: SourceInfo {
                path: Some(path.to_path_buf()),
                format,
                file_size_bytes: Some(file_size),
            },
        })
    }

    /// Decode an in-memory image buffer
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        if bytes.is_empty() {
            return Err(AppError::ImageLoad("image buffer is empty".to_string()));
        }
        let format = image::guess_format(bytes).ok();
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AppError::ImageLoad(format!("cannot decode image buffer: {e}")))?;

        Ok(Self {
            pixels: Arc::new(decoded),
            source: SourceInfo {
                path: None,
                format,
                file_size_bytes: Some(bytes.len() as u64),
            },
        })
    }

    /// Wrap an already decoded image
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: Arc::new(image),
            source: SourceInfo::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn pixel_mode(&self) -> PixelMode {
        PixelMode::from_color_type(self.pixels.color())
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// Borrow the decoded buffer
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Shared handle to the decoded buffer, for handing to worker threads
    pub fn shared_pixels(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.pixels)
    }

    /// Owned RGB copy. Alpha is dropped, grayscale is replicated into all channels.
    pub fn to_rgb8(&self) -> RgbImage {
        self.pixels.to_rgb8()
    }

    /// Owned single-channel luminance copy (ITU-R 601-2 weights)
    pub fn to_luma8(&self) -> GrayImage {
        match self.pixels.as_ref() {
            DynamicImage::ImageLuma8(gray) => gray.clone(),
            other => luminance(&other.to_rgb8()),
        }
    }

    /// Single-channel luminance view as a new image
    pub fn to_grayscale(&self) -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageLuma8(self.to_luma8()))
    }

    /// Copy the region `[x0, x1) x [y0, y1)` into a new image.
    ///
    /// # Errors
    ///
    /// `AppError::InvalidRegion` if the bounds exceed the image or describe an
    /// empty rectangle.
    pub fn crop(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> AppResult<RasterImage> {
        let (width, height) = self.dimensions();
        if x1 <= x0 || y1 <= y0 || x1 > width || y1 > height {
            return Err(AppError::InvalidRegion {
                x0,
                y0,
                x1,
                y1,
                width,
                height,
            });
        }

        debug!(x0, y0, x1, y1, "Cropping region");
        Ok(RasterImage::from_dynamic(
            self.pixels.crop_imm(x0, y0, x1 - x0, y1 - y0),
        ))
    }
}

/// Convert RGB to luminance with the fixed-point ITU-R 601-2 transform
/// `L = R * 299/1000 + G * 587/1000 + B * 114/1000`, rounded.
fn luminance(rgb: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (src, dst) in rgb.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = src.0;
        let l = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16;
        *dst = Luma([l.min(255) as u8]);
    }
    gray
}

/// Validate an image path and return its size in bytes
fn validate_image_path(path: &Path) -> AppResult<u64> {
    if !path.exists() {
        return Err(AppError::ImageLoad(format!(
            "file does not exist ({})",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(AppError::ImageLoad(format!(
            "path is not a file ({})",
            path.display()
        )));
    }

    let file_size = path
        .metadata()
        .map_err(|e| {
            AppError::ImageLoad(format!(
                "cannot read file metadata ({}) - {}",
                path.display(),
                e
            ))
        })?
        .len();

    if file_size == 0 {
        return Err(AppError::ImageLoad(format!(
            "file is empty ({})",
            path.display()
        )));
    }

    Ok(file_size)
}
