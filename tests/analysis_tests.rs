//! # Visual Analysis Tests
//!
//! End-to-end checks of image loading, color/brightness statistics, regional
//! analysis and classification on PNG files written to a temporary directory.


#[cfg(test)]
mod tests {
    use super::test_helpers::{dialog_screenshot, rgb_image, write_png};
    use screenshot_analyzer::aggregator::LayoutHint;
    use screenshot_analyzer::classifier::{ClassifierThresholds, ContentHypothesis};
    use screenshot_analyzer::color_analysis::{analyze_brightness, analyze_color, rank_colors};
    use screenshot_analyzer::image_source::{PixelMode, RasterImage};
    use screenshot_analyzer::regions::{analyze_regions, Zone};
    use screenshot_analyzer::{AppError, ScreenshotAnalyzer};
    use tempfile::TempDir;

    fn visual_analyzer() -> ScreenshotAnalyzer {
        ScreenshotAnalyzer::without_ocr(ClassifierThresholds::default())
    }

    /// A solid black screenshot yields zero statistics and three hypotheses
    #[test]
    fn test_black_screenshot_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "black.png", &rgb_image(4, 4, |_, _| [0, 0, 0]));

        let report = visual_analyzer().analyze_path(&path).unwrap();

        let brightness = report.brightness();
        assert_eq!(brightness.mean, 0.0);
        assert_eq!(brightness.std, 0.0);
        assert_eq!((brightness.min, brightness.max), (0, 0));
        assert_eq!(report.contrast().contrast_ratio, 0.0);
        assert!(!report.contrast().high_contrast);
        assert_eq!(report.background().intensity, 0);
        assert_eq!(report.background().fraction, 1.0);

        let hypotheses: Vec<&str> = report.hypotheses().iter().map(|h| h.as_str()).collect();
        assert_eq!(
            hypotheses,
            vec![
                "dark theme",
                "low contrast: simple interface or image",
                "uniform background: likely clean interface"
            ]
        );
        assert!(report.ocr().is_none());
        assert!(report.keywords().is_empty());
    }

    /// File metadata is taken from the file on disk
    #[test]
    fn test_file_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "dialog.png", &dialog_screenshot());
        let expected_size = std::fs::metadata(&path).unwrap().len();

        let report = visual_analyzer().analyze_path(&path).unwrap();
        let file = report.file();

        assert_eq!(file.file_name.as_deref(), Some("dialog.png"));
        assert_eq!(file.file_size_bytes, Some(expected_size));
        assert_eq!(file.format.as_deref(), Some("PNG"));
        assert_eq!((file.width, file.height), (64, 40));
        assert_eq!(file.pixel_mode, PixelMode::Rgb);
        assert!((file.aspect_ratio - 1.6).abs() < 1e-9);
        assert_eq!(report.layout(), LayoutHint::Wide);
    }

    /// A mostly white dialog reads as a light theme with a uniform background
    #[test]
    fn test_light_dialog_classification() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "dialog.png", &dialog_screenshot());

        let report = visual_analyzer().analyze_path(&path).unwrap();

        assert_eq!(report.hypotheses()[0], ContentHypothesis::LightTheme);
        assert_eq!(
            report.hypotheses().last(),
            Some(&ContentHypothesis::UniformBackground)
        );
        assert_eq!(report.background().intensity, 250);
        assert_eq!(report.color().dominant_colors[0].rgb, [250, 250, 250]);
        assert_eq!(report.color().total_colors, 3);
    }

    /// Uniform mid-gray: mixed theme, low contrast and uniform background
    #[test]
    fn test_uniform_mid_gray() {
        let image = RasterImage::from_dynamic(image::DynamicImage::ImageRgb8(rgb_image(
            10,
            6,
            |_, _| [128, 128, 128],
        )));
        let report = visual_analyzer().analyze_image(&image).unwrap();

        assert_eq!(report.brightness().mean, 128.0);
        assert_eq!(report.brightness().std, 0.0);
        assert_eq!(report.contrast().contrast_ratio, 0.0);
        assert_eq!(
            report.hypotheses(),
            &[
                ContentHypothesis::MixedTheme,
                ContentHypothesis::LowContrast,
                ContentHypothesis::UniformBackground
            ]
        );
    }

    /// Four distinct corner colors are each counted once, in encounter order
    #[test]
    fn test_distinct_corner_colors() {
        let corners = [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 0, 255]];
        let image = RasterImage::from_dynamic(image::DynamicImage::ImageRgb8(rgb_image(
            2,
            2,
            |x, y| corners[(y * 2 + x) as usize],
        )));

        let stats = analyze_color(&image).unwrap();
        assert_eq!(stats.total_colors, 4);
        assert_eq!(stats.dominant_colors.len(), 4);
        assert!(stats.dominant_colors.iter().all(|c| c.count == 1));
        let order: Vec<[u8; 3]> = stats.dominant_colors.iter().map(|c| c.rgb).collect();
        assert_eq!(order, corners.to_vec());
    }

    /// Only five colors are surfaced even when many more are present
    #[test]
    fn test_dominant_colors_truncated_to_five() {
        // Column x gets color x, and column x is (x + 1) pixels tall
        let image = rgb_image(12, 12, |x, y| if y <= x { [x as u8 * 20, 0, 0] } else { [0, 0, 255] });
        let stats = analyze_color(&RasterImage::from_dynamic(image::DynamicImage::ImageRgb8(
            image,
        )))
        .unwrap();

        assert_eq!(stats.total_colors, 13);
        assert_eq!(stats.dominant_colors.len(), 5);
        // blue fills 66 pixels, then columns 11, 10, 9, 8
        let counts: Vec<u64> = stats.dominant_colors.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![66, 12, 11, 10, 9]);
    }

    /// Invariants that hold for any non-degenerate image
    #[test]
    fn test_statistics_invariants_on_gradient() {
        let rgb = rgb_image(37, 23, |x, y| {
            [(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x * y) % 256) as u8]
        });
        let ranked = rank_colors(&rgb);
        let image = RasterImage::from_dynamic(image::DynamicImage::ImageRgb8(rgb));

        let (brightness, contrast, background) = analyze_brightness(&image).unwrap();
        assert!(f64::from(brightness.min) <= brightness.mean);
        assert!(brightness.mean <= f64::from(brightness.max));
        assert!(brightness.std >= 0.0);
        assert!((0.0..=1.0).contains(&contrast.contrast_ratio));
        assert!(background.fraction > 0.0 && background.fraction <= 1.0);

        assert!(ranked.windows(2).all(|pair| pair[0].count >= pair[1].count));
        assert_eq!(ranked.iter().map(|c| c.count).sum::<u64>(), 37 * 23);

        let regions = analyze_regions(&image).unwrap();
        assert_eq!(regions.len(), 5);
        assert!(regions.get(Zone::Center).is_some());
    }

    /// Missing and undecodable files fail with an image load error
    #[test]
    fn test_unreadable_files() {
        let dir = TempDir::new().unwrap();
        let analyzer = visual_analyzer();

        let missing = analyzer.analyze_path(dir.path().join("nope.png"));
        assert!(matches!(missing, Err(AppError::ImageLoad(_))));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"definitely not a png").unwrap();
        assert!(matches!(
            analyzer.analyze_path(&corrupt),
            Err(AppError::ImageLoad(_))
        ));

        assert!(matches!(
            analyzer.analyze_path(dir.path()),
            Err(AppError::ImageLoad(_))
        ));
    }

    /// One bad file does not stop the others from being analyzed
    #[test]
    fn test_batch_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        let good_a = write_png(dir.path(), "a.png", &dialog_screenshot());
        let bad = dir.path().join("b.png");
        std::fs::write(&bad, b"\x89PNG truncated").unwrap();
        let good_c = write_png(dir.path(), "c.png", &rgb_image(3, 3, |_, _| [9, 9, 9]));

        let analyzer = visual_analyzer();
        let results: Vec<_> = [good_a, bad, good_c]
            .iter()
            .map(|path| analyzer.analyze_path(path))
            .collect();

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    /// Degenerate images fail regional analysis
    #[test]
    fn test_single_pixel_image_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "pixel.png", &rgb_image(1, 1, |_, _| [1, 2, 3]));
        assert!(matches!(
            visual_analyzer().analyze_path(&path),
            Err(AppError::Analysis(_))
        ));
    }

    /// Decoding from memory gives the same statistics as decoding from disk
    #[test]
    fn test_bytes_and_path_agree() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "dialog.png", &dialog_screenshot());
        let bytes = std::fs::read(&path).unwrap();

        let from_path = RasterImage::load(&path).unwrap();
        let from_bytes = RasterImage::from_bytes(&bytes).unwrap();

        assert_eq!(analyze_color(&from_path).unwrap(), analyze_color(&from_bytes).unwrap());
        assert_eq!(
            analyze_brightness(&from_path).unwrap(),
            analyze_brightness(&from_bytes).unwrap()
        );
        assert_eq!(from_bytes.source().file_size_bytes, Some(bytes.len() as u64));
    }

    /// Cropping never modifies the source and rejects bad bounds
    #[test]
    fn test_crop_contract() {
        let image = RasterImage::from_dynamic(image::DynamicImage::ImageRgb8(dialog_screenshot()));

        let crop = image.crop(20, 28, 44, 34).unwrap();
        assert_eq!(crop.dimensions(), (24, 6));
        assert_eq!(analyze_color(&crop).unwrap().total_colors, 1);
        assert_eq!(image.dimensions(), (64, 40));

        assert!(matches!(
            image.crop(10, 10, 10, 20),
            Err(AppError::InvalidRegion { .. })
        ));
        assert!(matches!(
            image.crop(0, 0, 65, 40),
            Err(AppError::InvalidRegion { .. })
        ));
    }

    /// The serialized report exposes every section under stable names
    #[test]
    fn test_report_json_shape() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "dialog.png", &dialog_screenshot());
        let report = visual_analyzer().analyze_path(&path).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "file",
            "layout",
            "color",
            "brightness",
            "contrast",
            "background",
            "regions",
            "hypotheses",
            "ocr",
            "extracted_text",
            "text_summaries",
            "keywords",
            "analyzed_at",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["layout"], "wide screen/landscape view");
        assert_eq!(json["hypotheses"][0], "light theme");
        assert!(json["ocr"].is_null());
        assert!(json["regions"]["top_left"]["mean_brightness"].is_number());
        assert_eq!(json["file"]["pixel_mode"], "RGB");
    }
}
