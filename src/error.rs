//! Error types for background removal operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Error types for background removal operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Input file or directory does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path has the wrong kind (directory where a file was expected, or vice versa)
    #[error("Not a {expected}: {}", .path.display())]
    NotAFile {
        path: PathBuf,
        expected: &'static str,
    },

    /// Image bytes could not be decoded
    #[error("Failed to decode image{}: {reason}", display_source(.path.as_deref()))]
    Decode {
        path: Option<PathBuf>,
        reason: String,
    },

    /// Output could not be encoded or written
    #[error("Failed to write '{}': {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    /// Invalid thresholds or blur parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Other filesystem errors (directory listing, metadata)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_source(path: Option<&Path>) -> String {
    path.map(|p| format!(" '{}'", p.display()))
        .unwrap_or_default()
}

impl BgRemovalError {
    /// Create a new not-found error
    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::NotFound(path.as_ref().to_path_buf())
    }

    /// A directory was given where a file was expected
    pub fn not_a_file<P: AsRef<Path>>(path: P) -> Self {
        Self::NotAFile {
            path: path.as_ref().to_path_buf(),
            expected: "file",
        }
    }

    /// A file was given where a directory was expected
    pub fn not_a_directory<P: AsRef<Path>>(path: P) -> Self {
        Self::NotAFile {
            path: path.as_ref().to_path_buf(),
            expected: "directory",
        }
    }

    /// Create a decode error for a file on disk
    pub fn decode<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Decode {
            path: Some(path.as_ref().to_path_buf()),
            reason: reason.into(),
        }
    }

    /// Create a decode error for in-memory data
    pub fn decode_bytes<S: Into<String>>(reason: S) -> Self {
        Self::Decode {
            path: None,
            reason: reason.into(),
        }
    }

    /// Create an encode error
    pub fn encode<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Encode {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }
}
