//! Extpack - extension manifest generation for VSIX-style packages
//!
//! This library turns flat package-metadata key/value pairs into the
//! `extension.vsixmanifest` document of an extension package, tracks the files
//! bundled into the package, and decides the MIME content type of every file
//! for the package's `[Content_Types].xml` part.
//!
//! # Architecture
//!
//! ```text
//! process_key ──► ManifestBuilder ──► ManifestDocument (xml2js-shaped tree)
//!                      │
//!                      ├── FileSet (registered package parts)
//!                      │
//!                      ├── validate() ──► rule table ──► Vec<String>
//!                      │
//!                      └── finalize() ──► ContentTypeResolver ──► ContentTypeFragment
//!                                          ├── RegistryResolver (per-extension lookup)
//!                                          └── SniffingResolver (per-file probe + majority vote)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use extpack::manifest::{BuilderConfig, ManifestBuilder};
//! use serde_json::json;
//!
//! let mut builder = ManifestBuilder::new(BuilderConfig::new("./my-extension"));
//! builder.process_key("id", &json!("my-extension"), false)?;
//! builder.process_key("version", &json!("1.0.0"), false)?;
//!
//! for violation in builder.validate() {
//!     eprintln!("{}", violation);
//! }
//!
//! builder.finalize().await?;
//! let manifest_xml = builder.get_result()?;
//! ```

pub mod content_types;
pub mod logging;
pub mod manifest;
pub mod package;
pub mod xml;
