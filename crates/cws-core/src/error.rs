//! Domain-specific error types following panic-free policy.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in domain operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Failed to read a transcript file
    #[error("Failed to read {path}: {source}")]
    TranscriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a transcript entry
    #[error("Failed to parse transcript entry: {0}")]
    EntryParse(#[from] serde_json::Error),
}

/// Result type for domain operations.
pub type CoreResult<T> = Result<T, CoreError>;
