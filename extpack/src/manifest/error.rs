//! Error types for manifest building.

use thiserror::Error;

use crate::content_types::ContentTypeError;
use crate::package::FileError;
use crate::xml::XmlError;

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that abort a manifest operation.
///
/// Validation violations are not errors; see
/// [`ManifestBuilder::validate`](super::ManifestBuilder::validate).
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A single-value field already holds a different value and overriding
    /// was not allowed.
    #[error("conflicting values for '{key}': '{existing}' is already set, cannot set '{attempted}'")]
    Conflict {
        key: String,
        existing: String,
        attempted: String,
    },

    /// A branding color could not be parsed.
    #[error("could not parse color '{0}'; use a hex color such as #ff8800")]
    InvalidColor(String),

    /// A configuration value has the wrong shape.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// A file declaration was rejected.
    #[error("invalid file declaration: {0}")]
    File(#[from] FileError),

    /// The builder was already finalized.
    #[error("manifest has already been finalized")]
    AlreadyFinalized,

    /// Serializing a document failed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Content-type resolution failed.
    #[error(transparent)]
    ContentType(#[from] ContentTypeError),
}

impl ManifestError {
    pub(crate) fn invalid_value(key: &str, reason: impl Into<String>) -> Self {
        ManifestError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
