//! Content-type resolution for package files.
//!
//! Every file in an extension package must be declared with a MIME type in
//! the package's `[Content_Types].xml` part. Files with an explicit content
//! type keep it; everything else is resolved by one of two strategies:
//!
//! - [`RegistryResolver`] - looks up each distinct extension in an
//!   authoritative file-association registry (the Windows `HKCR` hive)
//! - [`SniffingResolver`] - probes the bytes of each file (the `file`
//!   command) and picks the majority type per extension
//!
//! Both strategies sit behind the [`ContentTypeResolver`] trait and produce
//! the same output: extension defaults returned to the caller, and per-file
//! content types written into the [`FileSet`]. [`ContentTypeFragment::build`]
//! turns that into the final fragment.
//!
//! # Concurrency
//!
//! Lookups and probes are independent. Each strategy launches all of them at
//! once and joins them with `futures::future::join_all` before aggregating,
//! so aggregation never depends on completion order.
//!
//! # Example
//!
//! ```ignore
//! use extpack::content_types::{resolver_for, ContentTypeFragment, ResolverConfig};
//!
//! let resolver = resolver_for(&ResolverConfig::default());
//! let defaults = resolver.resolve(&mut files).await?;
//! let fragment = ContentTypeFragment::build(defaults, &files);
//! println!("{}", fragment.to_xml()?);
//! ```

mod config;
mod error;
mod fragment;
mod registry;
mod sniffing;

use std::future::Future;
use std::pin::Pin;

use crate::package::FileSet;

pub use config::{
    ContentTypeStrategy, ResolverConfig, DEFAULT_REGISTRY_COMMAND, DEFAULT_SNIFF_COMMAND,
};
pub use error::{ContentTypeError, ContentTypeResult};
pub use fragment::{ContentTypeFragment, OverrideEntry, CONTENT_TYPES_NAMESPACE};
pub use registry::{parse_reg_query, ExtensionRegistry, RegistryResolver, WindowsRegistry};
pub use sniffing::{ContentSniffer, ExtensionTally, FileCommand, SniffingResolver};

/// Fallback content type for anything that cannot be resolved.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Content types of the file kinds extension packages commonly carry.
///
/// Keys are lowercased extensions including the leading dot.
const BUILTIN_CONTENT_TYPES: &[(&str, &str)] = &[
    (".md", "text/markdown"),
    (".pdf", "application/pdf"),
    (".png", "image/png"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".bat", "application/bat"),
    (".json", "application/json"),
    (".vsixlangpack", "text/xml"),
    (".vsixmanifest", "text/xml"),
    (".vsomanifest", "application/json"),
    (".xml", "text/xml"),
    (".ps1", "text/ps1"),
    (".js", "application/javascript"),
    (".css", "text/css"),
    (".html", "text/html"),
    (".txt", "text/plain"),
];

/// Look up an extension in the built-in table.
///
/// # Examples
///
/// ```
/// use extpack::content_types::builtin_content_type;
///
/// assert_eq!(builtin_content_type(".png"), Some("image/png"));
/// assert_eq!(builtin_content_type(".PNG"), Some("image/png"));
/// assert_eq!(builtin_content_type(".exe"), None);
/// ```
pub fn builtin_content_type(extension: &str) -> Option<&'static str> {
    BUILTIN_CONTENT_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, content_type)| *content_type)
}

/// An extension-level content type decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEntry {
    /// Lowercased extension including the leading dot.
    pub extension: String,

    /// Content type for every file with this extension that has no override.
    pub content_type: String,
}

impl DefaultEntry {
    /// Create a default entry.
    pub fn new(extension: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            content_type: content_type.into(),
        }
    }
}

/// Assigns content types to the files of a package.
///
/// Implementations write per-file decisions into
/// [`RegisteredFile::content_type`](crate::package::RegisteredFile) and return
/// one [`DefaultEntry`] per resolved extension, in first-seen order. Files that
/// already carry a content type are left untouched.
///
/// # Dyn Compatibility
///
/// This trait uses `Pin<Box<dyn Future>>` so that the strategy can be chosen
/// at startup and held as `Box<dyn ContentTypeResolver>`.
pub trait ContentTypeResolver: Send + Sync {
    /// Resolve content types for every file in the set.
    fn resolve<'a>(
        &'a self,
        files: &'a mut FileSet,
    ) -> BoxFuture<'a, ContentTypeResult<Vec<DefaultEntry>>>;
}

/// Create the production resolver for a configuration.
///
/// `ContentTypeStrategy::Auto` is resolved against the host platform here, so
/// the resolution algorithms themselves never branch on the platform.
pub fn resolver_for(config: &ResolverConfig) -> Box<dyn ContentTypeResolver> {
    match config.strategy.effective() {
        ContentTypeStrategy::Registry => Box::new(RegistryResolver::new(WindowsRegistry::new(
            config.registry_command.clone(),
        ))),
        _ => Box::new(SniffingResolver::new(FileCommand::new(
            config.sniff_command.clone(),
        ))),
    }
}
