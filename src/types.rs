//! Core types for background removal operations

use crate::error::{BgRemovalError, Result};
use image::{DynamicImage, GrayImage, RgbaImage};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opacity value for background pixels
pub const MASK_TRANSPARENT: u8 = 0;
/// Opacity value for foreground pixels
pub const MASK_OPAQUE: u8 = u8::MAX;

/// Result of a background removal operation
#[derive(Debug, Clone)]
pub struct RemovalResult {
    /// The original color channels with the mask attached as alpha
    pub image: RgbaImage,

    /// The smoothed opacity mask
    pub mask: SegmentationMask,

    /// Original image dimensions
    pub original_dimensions: (u32, u32),

    /// Stage timings
    pub timings: ProcessingTimings,

    /// Original input path (for logging purposes)
    pub input_path: Option<String>,
}

impl RemovalResult {
    /// Create a new removal result
    #[must_use]
    pub fn new(image: RgbaImage, mask: SegmentationMask, timings: ProcessingTimings) -> Self {
        let original_dimensions = image.dimensions();
        Self {
            image,
            mask,
            original_dimensions,
            timings,
            input_path: None,
        }
    }

    /// Attach the path the image was read from
    #[must_use]
    pub fn with_input_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.input_path = Some(path.as_ref().display().to_string());
        self
    }

    /// Save the result as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::services::ImageIOService::save_png(&self.image, path)
    }

    /// Save as PNG and record the encoding time
    pub fn save_png_timed<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let encode_start = std::time::Instant::now();
        self.save_png(&path)?;
        let encode_ms = encode_start.elapsed().as_millis() as u64;

        self.timings.image_encode_ms = Some(encode_ms);
        self.timings.total_ms += encode_ms;

        info!(
            "Processed: {} -> {} in {}ms",
            self.input_path.as_deref().unwrap_or("input"),
            path.as_ref().display(),
            self.timings.total_ms
        );

        Ok(())
    }

    /// Encode the result as PNG bytes
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| BgRemovalError::encode("<memory>", e.to_string()))?;
        Ok(buffer)
    }

    /// Get the image as raw RGBA bytes
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    /// The result as a `DynamicImage`
    #[must_use]
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.image.clone())
    }

    /// Get image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Get timing summary for display
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.timings;
        let mut summary = format!(
            "Total: {}ms | Decode: {}ms | Classify: {}ms | Blur: {}ms | Composite: {}ms",
            t.total_ms, t.image_decode_ms, t.classify_ms, t.blur_ms, t.composite_ms
        );
        if let Some(encode_ms) = t.image_encode_ms {
            summary.push_str(&format!(" | Encode: {}ms", encode_ms));
        }
        summary
    }
}

/// Single-channel opacity mask
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0-255), row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Create mask from a grayscale image
    #[must_use]
    pub fn from_image(image: &GrayImage) -> Self {
        Self::new(image.as_raw().clone(), image.dimensions())
    }

    /// Opacity at a pixel, `None` outside the mask
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        let (width, height) = self.dimensions;
        if x >= width || y >= height {
            return None;
        }
        self.data.get((y as usize) * (width as usize) + x as usize).copied()
    }

    /// Get mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&x| x > 127).count();
        let background_pixels = total_pixels - foreground_pixels;
        let partial_pixels = self
            .data
            .iter()
            .filter(|&&x| x != MASK_TRANSPARENT && x != MASK_OPAQUE)
            .count();

        let ratio = |count: usize| {
            if total_pixels == 0 {
                0.0
            } else {
                count as f32 / total_pixels as f32
            }
        };

        MaskStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            partial_pixels,
            foreground_ratio: ratio(foreground_pixels),
            background_ratio: ratio(background_pixels),
        }
    }
}

/// Statistics about a segmentation mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    /// Pixels with partial opacity, produced by smoothing
    pub partial_pixels: usize,
    pub foreground_ratio: f32,
    pub background_ratio: f32,
}

/// Timing breakdown for one image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Image loading and decoding from file
    pub image_decode_ms: u64,

    /// HSV conversion and range test
    pub classify_ms: u64,

    /// Mask smoothing
    pub blur_ms: u64,

    /// Attaching the mask as alpha
    pub composite_ms: u64,

    /// Final image encoding (if saving to file)
    pub image_encode_ms: Option<u64>,

    /// Total end-to-end processing time
    pub total_ms: u64,
}
