//! Error types for the imgclass library.
//!
//! Uses thiserror for ergonomic error definitions. The training driver and
//! CLI wrap these in `anyhow` for reporting.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for imgclass operations
#[derive(Error, Debug)]
pub enum Error {
    /// Error loading or decoding an image
    #[error("failed to load image at '{0}': {1}")]
    ImageLoad(PathBuf, String),

    /// Error with dataset operations
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Error saving or loading a checkpoint
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience Result type for imgclass operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Dataset("no class directories found".to_string());
        assert_eq!(
            format!("{}", err),
            "dataset error: no class directories found"
        );
    }

    #[test]
    fn test_image_load_error_includes_path() {
        let path = PathBuf::from("/data/train/cat/img_001.jpg");
        let err = Error::ImageLoad(path, "unexpected EOF".to_string());
        assert!(format!("{}", err).contains("img_001.jpg"));
    }
}
