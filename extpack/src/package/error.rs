//! Error types for file registration.

use thiserror::Error;

/// Errors that can occur while registering a file declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileError {
    /// Neither a source path nor inline content was given.
    #[error("every file must specify a 'path' or inline 'content'")]
    MissingSource,

    /// Both a source path and inline content were given.
    #[error("file '{0}' specifies both 'path' and inline 'content'")]
    ConflictingSource(String),

    /// Inline content was given without a part name to store it under.
    #[error("inline file content requires a 'partName'")]
    MissingPartName,
}
