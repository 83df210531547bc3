//! End-to-end properties of the white background filter
//!
//! Fixtures are generated in memory and written to temporary directories.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;
use white_bgremove::{
    remove_background_from_file, remove_background_from_image, BackgroundClassifier,
    BgRemovalError, ImageIOService, MaskBlur, RemovalConfig, Result,
};

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

#[test]
fn test_white_image_becomes_fully_transparent() -> Result<()> {
    let result = remove_background_from_image(&solid(10, 10, [255, 255, 255]), &RemovalConfig::default())?;

    assert_eq!(result.dimensions(), (10, 10));
    assert!(result.image.pixels().all(|p| p[3] == 0));
    Ok(())
}

#[test]
fn test_near_white_noise_is_background() -> Result<()> {
    // Every pixel has saturation <= 25 and value >= 200
    let image = RgbImage::from_fn(16, 16, |x, y| {
        let v = 230 + ((x * 7 + y * 3) % 25) as u8;
        Rgb([v, v - 3, v - 5])
    });
    let result = remove_background_from_image(&DynamicImage::ImageRgb8(image), &RemovalConfig::default())?;

    assert!(result.image.pixels().all(|p| p[3] == 0));
    Ok(())
}

#[test]
fn test_black_image_stays_opaque() -> Result<()> {
    let result = remove_background_from_image(&solid(8, 8, [0, 0, 0]), &RemovalConfig::default())?;
    assert!(result.image.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    Ok(())
}

#[test]
fn test_saturated_red_stays_opaque() -> Result<()> {
    let result = remove_background_from_image(&solid(5, 5, [255, 0, 0]), &RemovalConfig::default())?;
    assert!(result.image.pixels().all(|p| p[3] == 255));
    Ok(())
}

#[test]
fn test_output_always_has_four_channels() -> Result<()> {
    let classifier = BackgroundClassifier::new(RemovalConfig::default())?;
    let inputs = [
        solid(4, 3, [10, 200, 30]),
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([255, 255, 255, 17]))),
        DynamicImage::ImageLuma8(image::GrayImage::new(4, 3)),
    ];

    for input in &inputs {
        let result = classifier.classify(input);
        assert_eq!(result.dimensions(), input.dimensions());
        assert_eq!(result.to_dynamic().color().channel_count(), 4);
    }
    Ok(())
}

#[test]
fn test_second_pass_keeps_transparent_regions() -> Result<()> {
    let mut image = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
    for y in 6..14 {
        for x in 5..15 {
            image.put_pixel(x, y, Rgb([30, 120, 60]));
        }
    }
    let config = RemovalConfig::default();

    let first = remove_background_from_image(&DynamicImage::ImageRgb8(image), &config)?;
    let second = remove_background_from_image(&first.to_dynamic(), &config)?;

    assert_eq!(first.image, second.image);
    assert_eq!(second.mask.get(0, 0), Some(0));
    assert_eq!(second.mask.get(10, 10), Some(255));
    Ok(())
}

#[test]
fn test_disabled_blur_gives_binary_alpha() -> Result<()> {
    let image = RgbImage::from_fn(9, 9, |x, y| {
        if (x + y) % 3 == 0 {
            Rgb([200, 40, 40])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let config = RemovalConfig::builder().blur(MaskBlur::disabled()).build()?;
    let result = remove_background_from_image(&DynamicImage::ImageRgb8(image), &config)?;

    let stats = result.mask.statistics();
    assert_eq!(stats.partial_pixels, 0);
    assert_eq!(stats.foreground_pixels, 27);
    Ok(())
}

#[test]
fn test_file_round_trip_writes_rgba_png() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("scan.jpg");
    solid(12, 12, [255, 255, 255]).save_with_format(&input, ImageFormat::Jpeg).unwrap();

    let mut result = remove_background_from_file(&input, &RemovalConfig::default())?;
    let output = ImageIOService::default_output_path(&input);
    result.save_png_timed(&output)?;

    assert_eq!(output, temp_dir.path().join("scan_no_bg.png"));
    let written = image::open(&output).unwrap();
    assert_eq!(written.color(), image::ColorType::Rgba8);
    assert!(written.to_rgba8().pixels().all(|p| p[3] == 0));
    assert!(result.timings.image_encode_ms.is_some());
    Ok(())
}

#[test]
fn test_missing_input_is_not_found_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("ghost.png");
    let output = temp_dir.path().join("ghost_no_bg.png");

    let err = BackgroundClassifier::default()
        .process_file_to(&input, &output)
        .unwrap_err();

    assert!(matches!(err, BgRemovalError::NotFound(_)));
    assert!(!output.exists());
}

#[test]
fn test_zero_byte_file_is_decode_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("empty.png");
    std::fs::write(&input, b"").unwrap();

    let err = remove_background_from_file(&input, &RemovalConfig::default()).unwrap_err();
    assert!(matches!(err, BgRemovalError::Decode { .. }));
}
