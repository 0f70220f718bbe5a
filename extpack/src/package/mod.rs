//! Package file tracking.
//!
//! This module provides the data structures describing the files bundled into
//! an extension package:
//!
//! - **FileDeclaration**: A file as declared in configuration (source path or
//!   inline content, part name, asset role, content type override)
//! - **RegisteredFile**: A file accepted into the package, keyed by its part
//!   name, with a content type filled in lazily during finalization
//! - **FileSet**: The ordered set of registered files
//!
//! # Part Names
//!
//! Every file lives in the package under a part name: a forward-slash path
//! with a leading `/` (e.g. `/images/icon.png`). Manifest asset entries use
//! the same path without the leading slash (the zip item name). See
//! [`naming`] for the conversions.

mod declaration;
mod error;
mod file_set;
pub mod naming;

pub use declaration::FileDeclaration;
pub use error::FileError;
pub use file_set::{FileSet, FileSource, RegisteredFile};
pub use naming::{clean_part_name, extension_of, part_name_for_path, to_zip_item_name};
