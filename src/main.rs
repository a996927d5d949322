use anyhow::Result;
use screenshot_analyzer::analyzer::ScreenshotAnalyzer;
use screenshot_analyzer::config::{AppConfig, InputConfig};
use screenshot_analyzer::errors::error_logging;
use screenshot_analyzer::observability;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Collect accepted screenshot files from `dir`, sorted by path
fn collect_screenshots(dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Screenshot directory {} does not exist or is not a directory",
            dir.display()
        ));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && input.accepts(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env()?;
    if let Some(dir) = env::args_os().nth(1) {
        config.input.screenshot_dir = PathBuf::from(dir);
    }

    config.logging.validate()?;
    observability::init_tracing(&config.logging)?;

    config.validate().map_err(|e| {
        error_logging::log_config_error(&e, "app_config", "startup_validation");
        anyhow::anyhow!("Configuration validation failed: {}", e)
    })?;
    info!("{}", config.summary());

    let files = collect_screenshots(&config.input.screenshot_dir, &config.input)?;
    if files.is_empty() {
        warn!(
            dir = %config.input.screenshot_dir.display(),
            extensions = %config.input.extensions.join(","),
            "No screenshots found"
        );
        return Ok(());
    }

    let analyzer = ScreenshotAnalyzer::new(&config)?;
    info!(count = files.len(), ocr_enabled = analyzer.ocr_enabled(), "Analyzing screenshots");

    let mut failures = 0usize;
    for path in &files {
        match analyzer.analyze_path(path) {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => {
                failures += 1;
                error_logging::log_image_error(&e, "analyze_path", path.to_str(), None);
            }
        }
    }

    info!(
        analyzed = files.len() - failures,
        failed = failures,
        "Screenshot analysis finished"
    );
    Ok(())
}
