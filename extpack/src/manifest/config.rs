//! Configuration for the manifest builder.

use std::path::PathBuf;

use crate::content_types::ResolverConfig;

/// Installation target used when the configuration declares none.
pub const DEFAULT_INSTALLATION_TARGET: &str = "Microsoft.VisualStudio.Services";

/// Configuration for the manifest builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Directory that relative file paths are resolved against.
    pub extension_root: PathBuf,

    /// Installation target added at finalization when none was declared.
    ///
    /// `None` leaves the target list empty.
    pub default_target: Option<String>,

    /// Content-type resolution settings.
    pub resolver: ResolverConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            extension_root: PathBuf::from("."),
            default_target: Some(DEFAULT_INSTALLATION_TARGET.to_string()),
            resolver: ResolverConfig::default(),
        }
    }
}

impl BuilderConfig {
    /// Create a configuration rooted at the given directory.
    pub fn new(extension_root: impl Into<PathBuf>) -> Self {
        Self {
            extension_root: extension_root.into(),
            ..Default::default()
        }
    }

    /// Set the default installation target.
    pub fn with_default_target(mut self, target: Option<String>) -> Self {
        self.default_target = target;
        self
    }

    /// Set the content-type resolution settings.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}
