//! Near-white background classification and alpha compositing
//!
//! Everything here is a pure function of the input pixels and the explicit
//! parameters. The steps are:
//!
//! 1. RGB → HSV per pixel
//! 2. background test against [`ClassifierThresholds`]
//! 3. binary mask, 0 for background and 255 for foreground
//! 4. Gaussian smoothing of the mask (see [`crate::blur`])
//! 5. mask written into the alpha channel of the untouched color channels

use crate::blur::gaussian_blur_mask;
use crate::color::rgb_to_hsv;
use crate::config::{ClassifierThresholds, RemovalConfig};
use crate::error::Result;
use crate::services::ImageIOService;
use crate::types::{
    ProcessingTimings, RemovalResult, SegmentationMask, MASK_OPAQUE, MASK_TRANSPARENT,
};
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use log::debug;
use std::path::Path;
use std::time::Instant;
use tracing::instrument;

/// Whether a single RGB pixel is background under `thresholds`
#[must_use]
pub fn is_background(rgb: [u8; 3], thresholds: &ClassifierThresholds) -> bool {
    thresholds.contains(rgb_to_hsv(rgb))
}

/// Build the binary opacity mask: transparent where the pixel is background
///
/// Any alpha already present in `image` is ignored.
#[must_use]
pub fn foreground_mask(image: &DynamicImage, thresholds: &ClassifierThresholds) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut mask = GrayImage::new(rgb.width(), rgb.height());
    for (dst, src) in mask.pixels_mut().zip(rgb.pixels()) {
        *dst = if is_background(src.0, thresholds) {
            Luma([MASK_TRANSPARENT])
        } else {
            Luma([MASK_OPAQUE])
        };
    }
    mask
}

/// Color is copied unchanged (no premultiplication)
fn attach_alpha(image: &DynamicImage, mask: &GrayImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for (pixel, alpha) in rgba.pixels_mut().zip(mask.pixels()) {
        pixel[3] = alpha[0];
    }
    rgba
}

/// Run the whole filter: classify, smooth, composite
///
/// The output always has the input's dimensions and four channels.
///
/// ```rust
/// use image::{DynamicImage, Rgb, RgbImage};
/// use white_bgremove::{classifier::remove_white_background, RemovalConfig};
///
/// let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
/// let out = remove_white_background(&white, &RemovalConfig::default());
/// assert!(out.pixels().all(|p| p[3] == 0));
/// ```
#[must_use]
pub fn remove_white_background(image: &DynamicImage, config: &RemovalConfig) -> RgbaImage {
    let mask = foreground_mask(image, &config.thresholds);
    let smoothed = gaussian_blur_mask(&mask, &config.blur);
    attach_alpha(image, &smoothed)
}

/// Stateless background remover bound to one validated configuration
///
/// ```rust
/// use image::{DynamicImage, Rgb, RgbImage};
/// use white_bgremove::{BackgroundClassifier, RemovalConfig};
///
/// let classifier = BackgroundClassifier::new(RemovalConfig::default())?;
/// let black = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
/// let result = classifier.classify(&black);
/// assert_eq!(result.mask.statistics().foreground_pixels, 16);
/// # Ok::<(), white_bgremove::BgRemovalError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BackgroundClassifier {
    config: RemovalConfig,
}

impl BackgroundClassifier {
    /// Create a classifier after validating `config`
    ///
    /// # Errors
    /// * `InvalidConfig` - see [`RemovalConfig::validate`]
    pub fn new(config: RemovalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Classify, smooth and composite an already decoded image
    #[instrument(
        skip(self, image),
        fields(dimensions = %format!("{}x{}", image.width(), image.height()))
    )]
    pub fn classify(&self, image: &DynamicImage) -> RemovalResult {
        let mut timings = ProcessingTimings::default();
        let total_start = Instant::now();

        let classify_start = Instant::now();
        let binary = foreground_mask(image, &self.config.thresholds);
        timings.classify_ms = classify_start.elapsed().as_millis() as u64;

        let blur_start = Instant::now();
        let smoothed = gaussian_blur_mask(&binary, &self.config.blur);
        timings.blur_ms = blur_start.elapsed().as_millis() as u64;

        let composite_start = Instant::now();
        let rgba = attach_alpha(image, &smoothed);
        let mask = SegmentationMask::from_image(&smoothed);
        timings.composite_ms = composite_start.elapsed().as_millis() as u64;
        timings.total_ms = total_start.elapsed().as_millis() as u64;

        if self.config.debug {
            let stats = mask.statistics();
            debug!(
                "Mask: {} px, {:.1}% foreground, {} partial",
                stats.total_pixels,
                stats.foreground_ratio * 100.0,
                stats.partial_pixels
            );
        }
        tracing::debug!(
            classify_ms = timings.classify_ms,
            blur_ms = timings.blur_ms,
            composite_ms = timings.composite_ms,
            "Background classified"
        );

        RemovalResult::new(rgba, mask, timings)
    }

    /// Load `input` from disk and classify it
    ///
    /// # Errors
    /// * `NotFound`, `NotAFile`, `Decode` - see [`ImageIOService::load_image`]
    pub fn process_file<P: AsRef<Path>>(&self, input: P) -> Result<RemovalResult> {
        let input = input.as_ref();
        let decode_start = Instant::now();
        let image = ImageIOService::load_image(input)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;

        let mut result = self.classify(&image).with_input_path(input);
        result.timings.image_decode_ms = decode_ms;
        result.timings.total_ms += decode_ms;
        Ok(result)
    }

    /// Load `input`, classify it and write the PNG to `output`
    ///
    /// Nothing is written when loading fails.
    ///
    /// # Errors
    /// * load errors from [`Self::process_file`]
    /// * `Encode` - the output could not be written
    pub fn process_file_to<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<RemovalResult> {
        let mut result = self.process_file(input)?;
        result.save_png_timed(output)?;
        Ok(result)
    }
}
