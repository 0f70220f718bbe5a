//! File declarations as they appear in manifest configuration.

use serde::{Deserialize, Deserializer};

/// A file to bundle into the package.
///
/// Declarations come from the `files` manifest key (deserialized from JSON)
/// or are created by the key router for well-known roles such as icons,
/// screenshots and the details page.
///
/// # Example
///
/// ```
/// use extpack::package::FileDeclaration;
///
/// let icon = FileDeclaration::from_path("images/icon.png")
///     .with_asset_type("Microsoft.VisualStudio.Services.Icons.Default")
///     .addressable(true);
///
/// assert_eq!(icon.path.as_deref(), Some("images/icon.png"));
/// assert!(icon.addressable);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDeclaration {
    /// Source location, relative to the extension root unless absolute.
    #[serde(default)]
    pub path: Option<String>,

    /// Inline content, mutually exclusive with `path`.
    #[serde(default)]
    pub content: Option<String>,

    /// Name of the file inside the package.
    ///
    /// Defaults to the sanitized source path relative to the extension root.
    #[serde(default, alias = "packagePath")]
    pub part_name: Option<String>,

    /// Explicit content type, bypassing content-type resolution.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Manifest asset roles of this file.
    #[serde(default, deserialize_with = "one_or_many")]
    pub asset_type: Vec<String>,

    /// Whether the asset can be referenced by type from the hosting system.
    #[serde(default)]
    pub addressable: bool,

    /// Locale tag of a localized asset.
    #[serde(default)]
    pub lang: Option<String>,
}

impl FileDeclaration {
    /// Declare a file read from a source path.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Declare a file with inline content stored under `part_name`.
    pub fn inline(content: impl Into<String>, part_name: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            part_name: Some(part_name.into()),
            ..Default::default()
        }
    }

    /// Set the part name.
    pub fn with_part_name(mut self, part_name: impl Into<String>) -> Self {
        self.part_name = Some(part_name.into());
        self
    }

    /// Set an explicit content type.
    ///
    /// `None` leaves the content type to be resolved at finalization.
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Add an asset role.
    pub fn with_asset_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type.push(asset_type.into());
        self
    }

    /// Mark the file as addressable (or not).
    pub fn addressable(mut self, addressable: bool) -> Self {
        self.addressable = addressable;
        self
    }

    /// Set the locale tag.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_declaration() {
        let decl: FileDeclaration = serde_json::from_value(json!({
            "path": "docs/overview.md",
            "partName": "overview.md",
            "contentType": "text/markdown",
            "assetType": "Microsoft.VisualStudio.Services.Content.Details",
            "addressable": true,
            "lang": "de-DE"
        }))
        .unwrap();

        assert_eq!(decl.path.as_deref(), Some("docs/overview.md"));
        assert_eq!(decl.part_name.as_deref(), Some("overview.md"));
        assert_eq!(decl.content_type.as_deref(), Some("text/markdown"));
        assert_eq!(
            decl.asset_type,
            vec!["Microsoft.VisualStudio.Services.Content.Details".to_string()]
        );
        assert!(decl.addressable);
        assert_eq!(decl.lang.as_deref(), Some("de-DE"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let decl: FileDeclaration = serde_json::from_value(json!({ "path": "a.js" })).unwrap();
        assert!(!decl.addressable);
        assert!(decl.asset_type.is_empty());
        assert!(decl.part_name.is_none());
    }

    #[test]
    fn test_deserialize_asset_type_list_and_package_path_alias() {
        let decl: FileDeclaration = serde_json::from_value(json!({
            "path": "a.js",
            "packagePath": "scripts/a.js",
            "assetType": ["One", "Two"],
        }))
        .unwrap();
        assert_eq!(decl.part_name.as_deref(), Some("scripts/a.js"));
        assert_eq!(decl.asset_type, vec!["One".to_string(), "Two".to_string()]);
    }

    #[test]
    fn test_deserialize_null_asset_type() {
        let decl: FileDeclaration =
            serde_json::from_value(json!({ "path": "a.js", "assetType": null })).unwrap();
        assert!(decl.asset_type.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let decl = FileDeclaration::inline("<xml/>", "/generated.xml")
            .with_content_type(Some("text/xml".to_string()))
            .with_lang("en-US");
        assert_eq!(decl.content.as_deref(), Some("<xml/>"));
        assert_eq!(decl.part_name.as_deref(), Some("/generated.xml"));
        assert_eq!(decl.content_type.as_deref(), Some("text/xml"));
        assert_eq!(decl.lang.as_deref(), Some("en-US"));
    }
}
