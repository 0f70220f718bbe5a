//! The `[Content_Types].xml` package part.

use serde_json::{json, Value};

use super::{DefaultEntry, OCTET_STREAM};
use crate::package::{extension_of, FileSet};
use crate::xml::{to_xml, XmlError};

/// Namespace of the `Types` element.
pub const CONTENT_TYPES_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

/// A per-file content type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    /// Part name of the file (leading `/`).
    pub part_name: String,

    /// Declared content type.
    pub content_type: String,
}

/// Extension defaults and per-file overrides of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypeFragment {
    pub defaults: Vec<DefaultEntry>,
    pub overrides: Vec<OverrideEntry>,
}

impl ContentTypeFragment {
    /// Part name under which the fragment is stored in the package.
    pub const PART_NAME: &'static str = "/[Content_Types].xml";

    /// Build the fragment from resolved defaults and the file set.
    ///
    /// Every registered file gets an override. Its type is the file's own
    /// content type, else the default for its extension, else
    /// `application/octet-stream`.
    pub fn build(defaults: Vec<DefaultEntry>, files: &FileSet) -> Self {
        let overrides = files
            .iter()
            .map(|file| {
                let content_type = file
                    .content_type
                    .clone()
                    .or_else(|| {
                        extension_of(&file.part_name).and_then(|ext| {
                            defaults
                                .iter()
                                .find(|d| d.extension == ext)
                                .map(|d| d.content_type.clone())
                        })
                    })
                    .unwrap_or_else(|| OCTET_STREAM.to_string());

                OverrideEntry {
                    part_name: format!("/{}", file.zip_item_name()),
                    content_type,
                }
            })
            .collect();

        Self {
            defaults,
            overrides,
        }
    }

    /// Content type declared for an extension.
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|d| d.extension == extension)
            .map(|d| d.content_type.as_str())
    }

    /// Content type declared for a part.
    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|o| o.part_name == part_name)
            .map(|o| o.content_type.as_str())
    }

    /// Document tree of the fragment.
    pub fn to_value(&self) -> Value {
        let defaults: Vec<Value> = self
            .defaults
            .iter()
            .map(|d| json!({ "$": { "Extension": d.extension, "ContentType": d.content_type } }))
            .collect();
        let overrides: Vec<Value> = self
            .overrides
            .iter()
            .map(|o| json!({ "$": { "ContentType": o.content_type, "PartName": o.part_name } }))
            .collect();

        let mut types = serde_json::Map::new();
        types.insert("$".to_string(), json!({ "xmlns": CONTENT_TYPES_NAMESPACE }));
        if !defaults.is_empty() {
            types.insert("Default".to_string(), Value::Array(defaults));
        }
        if !overrides.is_empty() {
            types.insert("Override".to_string(), Value::Array(overrides));
        }

        json!({ "Types": Value::Object(types) })
    }

    /// Serialize the fragment to XML.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        to_xml(&self.to_value())
    }
}
