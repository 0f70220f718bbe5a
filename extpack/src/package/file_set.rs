//! The set of files bundled into a package.

use std::path::{Path, PathBuf};

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

use super::declaration::FileDeclaration;
use super::error::FileError;
use super::naming::{clean_part_name, part_name_for_path, to_zip_item_name};

/// Where the bytes of a registered file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file on disk.
    Path(PathBuf),

    /// Content held in memory.
    Inline(String),

    /// Content produced by the packaging pipeline when the package is written
    /// (e.g. the manifest document itself).
    Generated,
}

/// A file accepted into the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredFile {
    /// Part name inside the package (always starts with `/`).
    pub part_name: String,

    /// Source of the file's bytes.
    pub source: FileSource,

    /// Content type, either declared or filled in during resolution.
    pub content_type: Option<String>,

    /// Manifest asset roles.
    pub asset_types: Vec<String>,

    /// Whether the assets are addressable.
    pub addressable: bool,

    /// Locale tag of a localized asset.
    pub lang: Option<String>,
}

impl RegisteredFile {
    /// Zip item name (part name without the leading `/`).
    pub fn zip_item_name(&self) -> &str {
        to_zip_item_name(&self.part_name)
    }
}

/// Insertion-ordered set of registered files keyed by part name.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: IndexMap<String, RegisteredFile>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declared file.
    ///
    /// Relative source paths are resolved against `root`. Registering a part
    /// name that already exists merges the new asset roles into the existing
    /// entry; the first source and content type win.
    pub fn register(
        &mut self,
        declaration: FileDeclaration,
        root: &Path,
    ) -> Result<&RegisteredFile, FileError> {
        let FileDeclaration {
            path,
            content,
            part_name,
            content_type,
            asset_type,
            addressable,
            lang,
        } = declaration;

        let source = match (path, content) {
            (Some(path), None) => FileSource::Path(root.join(path.replace('\\', "/"))),
            (None, Some(content)) => FileSource::Inline(content),
            (Some(path), Some(_)) => return Err(FileError::ConflictingSource(path)),
            (None, None) => return Err(FileError::MissingSource),
        };

        let part_name = match (part_name, &source) {
            (Some(name), _) => clean_part_name(&name),
            (None, FileSource::Path(path)) => part_name_for_path(path, root),
            (None, _) => return Err(FileError::MissingPartName),
        };

        let mut asset_types = asset_type;
        if addressable && asset_types.is_empty() {
            asset_types.push(to_zip_item_name(&part_name).to_string());
        }

        match self.files.entry(part_name) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                for asset_type in asset_types {
                    if !existing.asset_types.contains(&asset_type) {
                        existing.asset_types.push(asset_type);
                    }
                }
                existing.addressable |= addressable;
                if existing.content_type.is_none() {
                    existing.content_type = content_type;
                }
                debug!(part_name = %existing.part_name, "Merged duplicate file registration");
                Ok(&*existing)
            }
            Entry::Vacant(entry) => {
                let part_name = entry.key().clone();
                debug!(part_name = %part_name, "Registered package file");
                Ok(&*entry.insert(RegisteredFile {
                    part_name,
                    source,
                    content_type,
                    asset_types,
                    addressable,
                    lang,
                }))
            }
        }
    }

    /// Register a part whose content is produced when the package is written.
    pub fn register_generated(&mut self, part_name: &str) -> &RegisteredFile {
        let part_name = clean_part_name(part_name);
        self.files
            .entry(part_name.clone())
            .or_insert_with(|| RegisteredFile {
                part_name,
                source: FileSource::Generated,
                content_type: None,
                asset_types: Vec::new(),
                addressable: false,
                lang: None,
            })
    }

    /// Look up a file by part name.
    pub fn get(&self, part_name: &str) -> Option<&RegisteredFile> {
        self.files.get(part_name)
    }

    /// Look up a file by part name for modification.
    pub fn get_mut(&mut self, part_name: &str) -> Option<&mut RegisteredFile> {
        self.files.get_mut(part_name)
    }

    /// Check whether a part name is registered.
    pub fn contains(&self, part_name: &str) -> bool {
        self.files.contains_key(part_name)
    }

    /// Iterate over files in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredFile> {
        self.files.values()
    }

    /// Iterate mutably over files in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegisteredFile> {
        self.files.values_mut()
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
