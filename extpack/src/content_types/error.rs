//! Error types for content-type resolution.

use std::io;

use thiserror::Error;

/// Result type for content-type resolution.
pub type ContentTypeResult<T> = Result<T, ContentTypeError>;

/// Errors that abort content-type resolution.
///
/// Lookups that merely come back empty are not errors; they fall back to
/// `application/octet-stream` with a warning.
#[derive(Debug, Error)]
pub enum ContentTypeError {
    /// An external probe command could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// An external probe command reported an explicit error.
    #[error("'{command}' failed: {message}")]
    Command { command: String, message: String },

    /// Content sniffing failed for a specific package file.
    #[error("could not determine content type of {part_name}: {reason}")]
    Sniff { part_name: String, reason: String },
}
