//! Error types for the caption batch pipeline.
//!
//! Errors are split between setup (configuration, discovery) and per-image
//! failures. Per-image failures carry the file path so a log line alone is
//! enough to find the offending image.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Captioner operations.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, from directory discovery down to a single caption write.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The image directory does not exist or is not a directory
    #[error("Image directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The image directory could not be listed
    #[error("Failed to list {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// Reading the image bytes failed
    #[error("Failed to read image {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// The caption service rejected the request or could not be reached.
    ///
    /// `status_code` is set when the service answered with a non-success
    /// HTTP status; `None` for malformed bodies and unsendable requests.
    #[error("{message}")]
    Service {
        message: String,
        status_code: Option<u16>,
    },

    /// No response arrived: connection refused or reset, DNS failure
    #[error("Caption service unreachable: {message}")]
    Connection { message: String },

    /// The service answered successfully but produced no caption text
    #[error("No caption generated for {path}")]
    EmptyCaption { path: PathBuf },

    /// The service call did not complete in time
    #[error("Caption request for {path} timed out after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },

    /// Writing the caption file failed
    #[error("Failed to write caption {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Convenience type alias for Captioner results.
pub type Result<T> = std::result::Result<T, CaptionError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
