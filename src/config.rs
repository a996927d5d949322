//! # Unified Application Configuration
//!
//! This module consolidates all settings into a single configuration object
//! loaded from environment variables. Every section validates itself;
//! [`AppConfig::validate`] runs them all.

use crate::classifier::ClassifierThresholds;
use crate::errors::{AppError, AppResult};
use crate::ocr_config::OcrConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCREENSHOT_DIR: &str = "Screen";
pub const DEFAULT_EXTENSIONS: &str = "png";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                other
            ))),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for this crate's targets when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> AppResult<()> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(AppError::Config(format!(
                "LOG_LEVEL must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.level
            )));
        }
        Ok(())
    }
}

/// Where the binary looks for screenshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub screenshot_dir: PathBuf,
    /// Accepted file extensions, lowercase and without the dot
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            extensions: parse_extensions(DEFAULT_EXTENSIONS),
        }
    }
}

impl InputConfig {
    /// Validate input configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.extensions.is_empty() {
            return Err(AppError::Config(
                "At least one screenshot extension is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `path` has one of the accepted extensions (case-insensitive)
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|accepted| *accepted == ext)
            })
            .unwrap_or(false)
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Unified application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run OCR at all; when false reports carry no text
    pub ocr_enabled: bool,
    /// OCR processing configuration
    pub ocr: OcrConfig,
    /// Content classifier cut-offs
    pub classifier: ClassifierThresholds,
    pub logging: LoggingConfig,
    pub input: InputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr_enabled: true,
            ocr: OcrConfig::default(),
            classifier: ClassifierThresholds::default(),
            logging: LoggingConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source; unset keys keep their defaults
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("SCREENSHOT_DIR") {
            config.input.screenshot_dir = PathBuf::from(dir);
        }
        if let Some(extensions) = lookup("SCREENSHOT_EXTENSIONS") {
            config.input.extensions = parse_extensions(&extensions);
        }

        if let Some(languages) = lookup("OCR_LANGUAGES") {
            config.ocr.languages = languages.trim().to_string();
        }
        config.ocr.tessdata_path = lookup("TESSDATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        if let Some(timeout) = lookup("OCR_TIMEOUT_SECS") {
            config.ocr.recovery.operation_timeout_secs = timeout.trim().parse().map_err(|_| {
                AppError::Config("OCR_TIMEOUT_SECS must be a valid number".to_string())
            })?;
        }
        if let Some(enabled) = lookup("OCR_ENABLED") {
            config.ocr_enabled = match enabled.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(AppError::Config(format!(
                        "OCR_ENABLED must be true or false, got '{}'",
                        other
                    )))
                }
            };
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level.trim().to_lowercase();
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.format = format.parse()?;
        }

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        if self.ocr_enabled {
            self.ocr.validate()?;
        }
        self.classifier.validate()?;
        self.logging.validate()?;
        self.input.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: screenshot_dir={}, extensions={}, ocr_enabled={}, ocr_languages={}, ocr_timeout_secs={}, log_level={}",
            self.input.screenshot_dir.display(),
            self.input.extensions.join(","),
            self.ocr_enabled,
            self.ocr.languages,
            self.ocr.recovery.operation_timeout_secs,
            self.logging.level
        )
    }
}
