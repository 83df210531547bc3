#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # White Background Removal Library
//!
//! Turns near-white backgrounds of product shots, scans and logos transparent.
//! Every pixel is converted to HSV; pixels with low saturation and high
//! brightness are background. The resulting binary mask is softened with a
//! small Gaussian blur and attached as the alpha channel of the untouched
//! color channels. Output is always an RGBA PNG.
//!
//! ## Features
//!
//! - **Pure filter**: image in, image out, thresholds as explicit parameters
//! - **Format Support**: JPEG, PNG, BMP, GIF and WebP input
//! - **Batch Processing**: directory runs with per-file failure isolation
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//! - **Async and Sync APIs**
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use white_bgremove::{remove_background_from_file, RemovalConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = RemovalConfig::builder().value_min(190).build()?;
//! let result = remove_background_from_file("product.jpg", &config)?;
//! result.save_png("product_no_bg.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Batch processing
//!
//! ```rust,no_run
//! use white_bgremove::{BatchOutcome, BatchProcessor, RemovalConfig};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let processor = BatchProcessor::new(RemovalConfig::default())?.recursive(true);
//! if let BatchOutcome::Completed(summary) = processor.run("photos", Some(Path::new("out")))? {
//!     println!("{} written, {} failed", summary.processed, summary.failed());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar and tracing setup
//! - `gui` (default): native file dialogs for interactive mode
//! - `webp-support` (default): WebP decoding
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! white-bgremove = { version = "0.1", default-features = false }
//! ```

pub mod batch;
pub mod blur;
pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use std::path::Path;
use tokio::io::AsyncRead;

// Public API exports
pub use batch::{BatchOutcome, BatchProcessor, BatchSummary};
pub use classifier::{remove_white_background, BackgroundClassifier};
pub use color::{rgb_to_hsv, Hsv};
pub use config::{ClassifierThresholds, MaskBlur, RemovalConfig, RemovalConfigBuilder};
pub use error::{BgRemovalError, Result};
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, ProcessingStage,
    ProgressReporter,
};
pub use types::{MaskStatistics, ProcessingTimings, RemovalResult, SegmentationMask};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, spans, TracingConfig, TracingFormat};

/// Remove the white background from a `DynamicImage`
///
/// # Examples
///
/// ```rust
/// use image::{DynamicImage, Rgb, RgbImage};
/// use white_bgremove::{remove_background_from_image, RemovalConfig};
///
/// let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([255, 0, 0])));
/// let result = remove_background_from_image(&red, &RemovalConfig::default())?;
/// assert!(result.image.pixels().all(|p| p[3] == 255));
/// # Ok::<(), white_bgremove::BgRemovalError>(())
/// ```
///
/// # Errors
/// * `InvalidConfig` - see [`RemovalConfig::validate`]
pub fn remove_background_from_image(
    image: &image::DynamicImage,
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    let classifier = BackgroundClassifier::new(config.clone())?;
    Ok(classifier.classify(image))
}

/// Remove the white background from encoded image bytes
///
/// Suitable for uploads and other in-memory sources.
///
/// # Errors
/// * `Decode` - empty or unrecognised data
/// * `InvalidConfig` - see [`RemovalConfig::validate`]
pub fn remove_background_from_bytes(
    image_bytes: &[u8],
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    let classifier = BackgroundClassifier::new(config.clone())?;
    let decode_start = std::time::Instant::now();
    let image = ImageIOService::load_from_bytes(image_bytes)?;
    let decode_ms = decode_start.elapsed().as_millis() as u64;

    let mut result = classifier.classify(&image);
    result.timings.image_decode_ms = decode_ms;
    result.timings.total_ms += decode_ms;
    Ok(result)
}

/// Remove the white background from an image file
///
/// # Errors
/// * `NotFound` / `NotAFile` - bad input path
/// * `Decode` - unreadable or corrupt image
/// * `InvalidConfig` - see [`RemovalConfig::validate`]
pub fn remove_background_from_file<P: AsRef<Path>>(
    input: P,
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    BackgroundClassifier::new(config.clone())?.process_file(input)
}

/// Remove the white background from an async reader stream
///
/// The stream is read to the end before decoding.
///
/// ```rust,no_run
/// use white_bgremove::{remove_background_from_reader, RemovalConfig};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let file = File::open("scan.png").await?;
/// let result = remove_background_from_reader(file, &RemovalConfig::default()).await?;
/// result.save_png("scan_no_bg.png")?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// * `Io` - the stream could not be read
/// * see [`remove_background_from_bytes`]
pub async fn remove_background_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;

    remove_background_from_bytes(&buffer, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_from_image_rejects_invalid_config() {
        let mut config = RemovalConfig::default();
        config.thresholds.saturation = (30, 20);
        let image = DynamicImage::new_rgb8(1, 1);
        assert!(matches!(
            remove_background_from_image(&image, &config),
            Err(BgRemovalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_bytes() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let result = remove_background_from_bytes(&png_bytes(&white), &RemovalConfig::default())
            .unwrap();

        assert_eq!(result.dimensions(), (10, 10));
        assert_eq!(result.mask.statistics().background_pixels, 100);
    }

    #[test]
    fn test_from_bytes_decode_error() {
        let err = remove_background_from_bytes(b"", &RemovalConfig::default()).unwrap_err();
        assert!(matches!(err, BgRemovalError::Decode { path: None, .. }));
    }

    #[tokio::test]
    async fn test_from_reader() {
        let black = DynamicImage::new_rgb8(3, 2);
        let reader = std::io::Cursor::new(png_bytes(&black));
        let result = remove_background_from_reader(reader, &RemovalConfig::default())
            .await
            .unwrap();

        assert_eq!(result.dimensions(), (3, 2));
        assert!(result.image.pixels().all(|p| p[3] == 255));
    }
}
