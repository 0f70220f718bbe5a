//! Extension manifest building.
//!
//! This module turns flat configuration keys into the `extension.vsixmanifest`
//! document of a package:
//!
//! - **ManifestDocument**: the xml2js-shaped tree under construction,
//!   addressed by dotted paths (see [`schema`] for the well-known ones)
//! - **ManifestBuilder**: owns the document and the package [`FileSet`],
//!   routes keys ([`ManifestBuilder::process_key`]), validates, and finalizes
//! - **Validation**: an ordered table of `(path, check)` rules
//!
//! # Lifecycle
//!
//! ```text
//! process_key / add_file (repeatedly)
//!         │
//!         ├── validate() at any time (read-only)
//!         ▼
//! finalize() once ──► asset entries, content types, [Content_Types].xml
//!         │
//!         ▼
//! get_result() / get_loc_result()
//! ```
//!
//! [`FileSet`]: crate::package::FileSet

mod branding;
mod builder;
mod config;
mod document;
mod error;
mod keys;
pub mod schema;
mod text;
pub mod validation;

pub use branding::normalize_color;
pub use builder::{merge_delimited, AssetEntry, ManifestBuilder};
pub use config::{BuilderConfig, DEFAULT_INSTALLATION_TARGET};
pub use document::{DocPath, ManifestDocument, Segment};
pub use error::{ManifestError, ManifestResult};
pub use keys::ManifestKey;
pub use text::{capitalize_key, start_case};
pub use validation::{validate, ValidationRule, RULES, VALID_CATEGORIES};
