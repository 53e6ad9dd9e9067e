//! Error types for JSON extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can end an extraction request
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The upload is missing, empty or not an email file
    #[error("{0}")]
    InvalidUpload(String),

    /// The request body exceeds the configured upload limit
    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// No JSON payload was located in attachments or linked resources
    #[error("JSON not found")]
    NotFound,

    /// Failed to parse the email structure
    #[error("Failed to parse email structure: {0}")]
    Parse(String),

    /// Failed to read an email file from disk
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status code reported for this error
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::InvalidUpload(_) => 400,
            Self::NotFound => 404,
            Self::PayloadTooLarge { .. } => 413,
            Self::Parse(_) | Self::Io { .. } | Self::Config(_) => 500,
        }
    }
}

/// Why a linked resource could not be retrieved.
///
/// Never surfaced to callers: the fetcher logs it and reports absence.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("response body is not valid UTF-8")]
    Body,
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
