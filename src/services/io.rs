//! Image I/O operations service
//!
//! This module separates file I/O operations from the pixel logic,
//! making the classifier a pure function over decoded images.

use crate::error::{BgRemovalError, Result};
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Extensions accepted as input, lowercase
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Suffix appended to the input stem for default output names
pub const OUTPUT_SUFFIX: &str = "_no_bg";

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Check that `path` names an existing regular file
    ///
    /// # Errors
    /// * `NotFound` - nothing exists at `path`
    /// * `NotAFile` - `path` is a directory
    pub fn validate_input<P: AsRef<Path>>(path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(BgRemovalError::not_found(path_ref));
        }
        if !path_ref.is_file() {
            return Err(BgRemovalError::not_a_file(path_ref));
        }
        Ok(())
    }

    /// Load an image from a file path
    ///
    /// Extension-based decoding is tried first; when that fails the bytes are
    /// sniffed for a known signature instead.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use white_bgremove::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    /// * `NotFound` / `NotAFile` - see [`Self::validate_input`]
    /// * `Decode` - empty file, corrupt data or unknown format
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();
        Self::validate_input(path_ref)?;

        let data = std::fs::read(path_ref).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BgRemovalError::not_found(path_ref)
            } else {
                BgRemovalError::decode(path_ref, format!("unreadable file: {}", e))
            }
        })?;

        if data.is_empty() {
            return Err(BgRemovalError::decode(path_ref, "file is empty"));
        }

        let by_extension = image::ImageFormat::from_path(path_ref)
            .ok()
            .map(|format| image::load_from_memory_with_format(&data, format));

        match by_extension {
            Some(Ok(img)) => Ok(img),
            Some(Err(extension_err)) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    extension_err
                );
                image::load_from_memory(&data).map_err(|content_err| {
                    BgRemovalError::decode(
                        path_ref,
                        format!(
                            "extension error: {}; content error: {} ({} bytes)",
                            extension_err,
                            content_err,
                            data.len()
                        ),
                    )
                })
            },
            None => image::load_from_memory(&data)
                .map_err(|e| BgRemovalError::decode(path_ref, e.to_string())),
        }
    }

    /// Load an image from bytes
    ///
    /// # Errors
    /// * `Decode` - the bytes are empty or not a recognised image
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(BgRemovalError::decode_bytes("no data"));
        }
        image::load_from_memory(bytes).map_err(|e| BgRemovalError::decode_bytes(e.to_string()))
    }

    /// Save an RGBA image as PNG, creating parent directories as needed
    ///
    /// The format is always PNG regardless of the extension of `path`.
    ///
    /// # Errors
    /// * `Encode` - the directory could not be created or the file written
    pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                BgRemovalError::encode(
                    path_ref,
                    format!("cannot create directory '{}': {}", parent.display(), e),
                )
            })?;
        }

        image
            .save_with_format(path_ref, image::ImageFormat::Png)
            .map_err(|e| BgRemovalError::encode(path_ref, e.to_string()))
    }

    /// Check if a file path has a supported image extension (case-insensitive)
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }

    /// `<dir>/<stem>_no_bg.png` next to the input
    #[must_use]
    pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
        let input = input.as_ref();
        let dir = input.parent().unwrap_or(Path::new(""));
        Self::output_path_in_dir(input, dir)
    }

    /// `<output_dir>/<stem>_no_bg.png`
    #[must_use]
    pub fn output_path_in_dir<P: AsRef<Path>, D: AsRef<Path>>(input: P, output_dir: D) -> PathBuf {
        let stem = input.as_ref().file_stem().unwrap_or_default();
        output_dir.as_ref().join(format!(
            "{}{}.png",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX
        ))
    }
}
