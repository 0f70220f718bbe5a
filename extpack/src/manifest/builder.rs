//! The manifest builder.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::config::BuilderConfig;
use super::document::ManifestDocument;
use super::error::{ManifestError, ManifestResult};
use super::schema;
use super::validation;
use crate::content_types::{resolver_for, ContentTypeFragment, ContentTypeResolver};
use crate::package::{clean_part_name, to_zip_item_name, FileDeclaration, FileSet};
use crate::xml::to_xml;

/// A typed file reference in the manifest's asset list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub asset_type: String,
    /// Zip item name (no leading `/`).
    pub path: String,
    pub addressable: bool,
    pub lang: Option<String>,
}

impl AssetEntry {
    fn to_value(&self) -> Value {
        let mut attrs = serde_json::Map::new();
        attrs.insert("Type".to_string(), json!(self.asset_type));
        attrs.insert("d:Source".to_string(), json!(schema::FILE_SOURCE));
        attrs.insert("Path".to_string(), json!(self.path));
        if self.addressable {
            attrs.insert("Addressable".to_string(), json!("true"));
        }
        if let Some(lang) = &self.lang {
            attrs.insert("Lang".to_string(), json!(lang));
        }
        json!({ "$": Value::Object(attrs) })
    }
}

/// Builds the manifest of an extension package.
///
/// The builder owns the manifest document and the set of files bundled into
/// the package. Configuration keys are fed in with
/// [`process_key`](Self::process_key); [`finalize`](Self::finalize) then
/// writes the asset entries and resolves content types.
///
/// # Example
///
/// ```ignore
/// let mut builder = ManifestBuilder::new(BuilderConfig::new("./ext"));
/// builder.process_key("id", &json!("my-extension"), false)?;
/// builder.finalize().await?;
/// let xml = builder.get_result()?;
/// ```
pub struct ManifestBuilder {
    pub(super) config: BuilderConfig,
    pub(super) document: ManifestDocument,
    pub(super) files: FileSet,
    resolver: Box<dyn ContentTypeResolver>,
    finalized: bool,
    content_types: Option<ContentTypeFragment>,
}

impl ManifestBuilder {
    /// Create a builder using the configured content-type strategy.
    pub fn new(config: BuilderConfig) -> Self {
        let resolver = resolver_for(&config.resolver);
        Self::with_resolver(config, resolver)
    }

    /// Create a builder with a specific content-type resolver.
    pub fn with_resolver(config: BuilderConfig, resolver: Box<dyn ContentTypeResolver>) -> Self {
        let mut files = FileSet::new();
        files.register_generated(schema::MANIFEST_PATH);

        Self {
            config,
            document: ManifestDocument::new(),
            files,
            resolver,
            finalized: false,
            content_types: None,
        }
    }

    /// In-package path of the manifest.
    pub fn path(&self) -> &'static str {
        schema::MANIFEST_PATH
    }

    /// In-package path of the localization fragment.
    pub fn loc_path(&self) -> &'static str {
        schema::LOC_PATH
    }

    /// The manifest document.
    pub fn document(&self) -> &ManifestDocument {
        &self.document
    }

    /// The registered package files.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// The content-type fragment, once finalized.
    pub fn content_types(&self) -> Option<&ContentTypeFragment> {
        self.content_types.as_ref()
    }

    /// Whether [`finalize`](Self::finalize) has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Write a single-value field.
    ///
    /// When `override_allowed` is false, a different existing value is a
    /// conflict. Writing the value already present is a no-op.
    pub(super) fn single_value(
        &mut self,
        path: &str,
        value: &str,
        override_allowed: bool,
        key: &str,
    ) -> ManifestResult<()> {
        if let Some(existing) = self.document.get_str(path) {
            if existing == value {
                return Ok(());
            }
            if !override_allowed {
                return Err(ManifestError::Conflict {
                    key: key.to_string(),
                    existing: existing.to_string(),
                    attempted: value.to_string(),
                });
            }
            debug!(key, existing, value, "Overriding manifest value");
        }
        self.document.set(path, json!(value));
        Ok(())
    }

    /// Merge items into a delimited list field.
    pub(super) fn delimited_list(&mut self, path: &str, items: &[String], delimiter: &str) {
        let merged = merge_delimited(self.document.get_str(path), items, delimiter);
        self.document.set(path, json!(merged));
    }

    /// Register a file for bundling.
    ///
    /// The manifest asset entry is written at finalization.
    pub fn add_file(&mut self, declaration: FileDeclaration) -> ManifestResult<()> {
        if self.finalized {
            return Err(ManifestError::AlreadyFinalized);
        }
        self.files
            .register(declaration, &self.config.extension_root)?;
        Ok(())
    }

    /// Append an asset entry to the manifest.
    ///
    /// Default icon and license assets also set the corresponding metadata
    /// pointer.
    pub fn add_asset_to_manifest(
        &mut self,
        path: &str,
        asset_type: &str,
        addressable: bool,
        lang: Option<&str>,
    ) {
        let entry = AssetEntry {
            asset_type: asset_type.to_string(),
            path: to_zip_item_name(path).to_string(),
            addressable,
            lang: lang.map(str::to_string),
        };
        append_asset(&mut self.document, &entry);
    }

    /// Append a property to the metadata properties list.
    pub fn add_property(&mut self, id: &str, value: &str) {
        self.document
            .push(schema::PROPERTIES, json!({ "$": { "Id": id, "Value": value } }));
    }

    /// Check the manifest and return every violation.
    ///
    /// Before finalization, the entries finalization will add (asset entries
    /// of the registered files and the default installation target) are
    /// checked as they will be written.
    pub fn validate(&self) -> Vec<String> {
        if self.finalized {
            return validation::validate(&self.document);
        }
        validation::validate(&self.staged_document())
    }

    /// Complete the manifest and resolve content types.
    ///
    /// Writes asset entries for every registered file with an asset role,
    /// resolves the content type of every file and registers the
    /// `[Content_Types].xml` part. Succeeds once; on failure the builder is
    /// left unchanged and finalization may be retried.
    pub async fn finalize(&mut self) -> ManifestResult<()> {
        if self.finalized {
            return Err(ManifestError::AlreadyFinalized);
        }

        let document = self.staged_document();
        let mut files = self.files.clone();

        let defaults = self.resolver.resolve(&mut files).await?;
        let fragment = ContentTypeFragment::build(defaults, &files);
        let xml = fragment.to_xml()?;

        files.register(
            FileDeclaration::inline(xml, ContentTypeFragment::PART_NAME)
                .with_content_type(Some("text/xml".to_string())),
            &self.config.extension_root,
        )?;

        if self.document.array(schema::INSTALLATION_TARGETS).is_empty() {
            if let Some(target) = &self.config.default_target {
                warn!(installation_target = %target, "No installation targets declared, using default");
            }
        }
        info!(
            files = files.len(),
            defaults = fragment.defaults.len(),
            "Manifest finalized"
        );

        self.document = document;
        self.files = files;
        self.content_types = Some(fragment);
        self.finalized = true;
        Ok(())
    }

    /// Copy of the document with the default installation target and pending
    /// asset entries applied.
    fn staged_document(&self) -> ManifestDocument {
        let mut document = self.document.clone();
        if document.array(schema::INSTALLATION_TARGETS).is_empty() {
            if let Some(target) = &self.config.default_target {
                document.push(schema::INSTALLATION_TARGETS, json!({ "$": { "Id": target } }));
            }
        }
        for entry in pending_assets(&self.files) {
            append_asset(&mut document, &entry);
        }
        document
    }

    /// XML text of the manifest.
    pub fn get_result(&self) -> ManifestResult<String> {
        Ok(to_xml(&self.document.ordered())?)
    }

    /// XML text of the manifest localized for one language.
    ///
    /// Display name, description and release notes take the value from
    /// `translations` when present, else from `defaults`. Keys are
    /// `displayName`, `description` and `releaseNotes`.
    pub fn get_loc_result(
        &self,
        translations: &HashMap<String, String>,
        defaults: &HashMap<String, String>,
    ) -> ManifestResult<String> {
        let mut localized = self.document.clone();
        for (key, path) in [
            ("displayName", schema::DISPLAY_NAME),
            ("description", schema::DESCRIPTION),
            ("releaseNotes", schema::RELEASE_NOTES),
        ] {
            if let Some(value) = translations.get(key).or_else(|| defaults.get(key)) {
                localized.set(path, json!(value));
                if path == schema::DESCRIPTION {
                    localized.set(schema::DESCRIPTION_SPACE, json!("preserve"));
                }
            }
        }
        Ok(to_xml(&localized.ordered())?)
    }
}

/// Asset entries for every registered file with an asset role, except the
/// manifest itself.
fn pending_assets(files: &FileSet) -> Vec<AssetEntry> {
    let manifest_part = clean_part_name(schema::MANIFEST_PATH);
    files
        .iter()
        .filter(|file| file.part_name != manifest_part)
        .flat_map(|file| {
            file.asset_types.iter().map(move |asset_type| AssetEntry {
                asset_type: asset_type.clone(),
                path: file.zip_item_name().to_string(),
                addressable: file.addressable,
                lang: file.lang.clone(),
            })
        })
        .collect()
}

fn append_asset(document: &mut ManifestDocument, entry: &AssetEntry) {
    match entry.asset_type.as_str() {
        schema::DEFAULT_ICON_ASSET => document.set(schema::ICON, json!(entry.path)),
        schema::LICENSE_ASSET => document.set(schema::LICENSE, json!(entry.path)),
        _ => {}
    }
    document.push(schema::ASSETS, entry.to_value());
}

/// Merge items into a delimited list.
///
/// The existing value is split on `delimiter`, blank items are dropped, new
/// items are appended and duplicates are removed keeping the first
/// occurrence.
///
/// # Examples
///
/// ```
/// use extpack::manifest::merge_delimited;
///
/// let merged = merge_delimited(Some("a,b"), &["b".to_string(), "c".to_string()], ",");
/// assert_eq!(merged, "a,b,c");
/// ```
pub fn merge_delimited(existing: Option<&str>, items: &[String], delimiter: &str) -> String {
    let mut merged: Vec<&str> = Vec::new();
    let existing_items = existing.into_iter().flat_map(|s| s.split(delimiter));
    for item in existing_items.chain(items.iter().map(String::as_str)) {
        let item = item.trim();
        if !item.is_empty() && !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged.join(delimiter)
}

/// Split a delimited list value into trimmed, non-empty items.
pub(super) fn split_delimited(value: &str, delimiter: &str) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_types::{
        BoxFuture, ContentTypeError, ContentTypeResult, DefaultEntry, OCTET_STREAM,
    };
    use crate::package::FileSet;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolver answering from the built-in table only.
    struct TableResolver;

    impl ContentTypeResolver for TableResolver {
        fn resolve<'a>(
            &'a self,
            files: &'a mut FileSet,
        ) -> BoxFuture<'a, ContentTypeResult<Vec<DefaultEntry>>> {
            Box::pin(async move {
                let mut defaults: Vec<DefaultEntry> = Vec::new();
                for file in files.iter_mut().filter(|f| f.content_type.is_none()) {
                    match crate::package::extension_of(&file.part_name) {
                        Some(ext) => {
                            let content_type = crate::content_types::builtin_content_type(&ext)
                                .unwrap_or(OCTET_STREAM);
                            if !defaults.iter().any(|d| d.extension == ext) {
                                defaults.push(DefaultEntry::new(ext, content_type));
                            }
                        }
                        None => file.content_type = Some(OCTET_STREAM.to_string()),
                    }
                }
                Ok(defaults)
            })
        }
    }

    /// Resolver failing a fixed number of times, then answering with no
    /// defaults.
    struct FailingResolver {
        failures: AtomicUsize,
    }

    impl FailingResolver {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
            }
        }
    }

    impl ContentTypeResolver for FailingResolver {
        fn resolve<'a>(
            &'a self,
            files: &'a mut FileSet,
        ) -> BoxFuture<'a, ContentTypeResult<Vec<DefaultEntry>>> {
            Box::pin(async move {
                let remaining = self.failures.load(Ordering::SeqCst);
                if remaining == 0 {
                    return Ok(Vec::new());
                }
                self.failures.store(remaining - 1, Ordering::SeqCst);
                // Partial progress before the failure must not leak out.
                for file in files.iter_mut() {
                    file.content_type = Some("text/x-partial".to_string());
                }
                Err(ContentTypeError::Sniff {
                    part_name: "/x.bin".to_string(),
                    reason: "boom".to_string(),
                })
            })
        }
    }

    fn builder() -> ManifestBuilder {
        ManifestBuilder::with_resolver(BuilderConfig::new("/ext"), Box::new(TableResolver))
    }

    #[test]
    fn test_paths() {
        let builder = builder();
        assert_eq!(builder.path(), "extension.vsixmanifest");
        assert_eq!(builder.loc_path(), "Extension.vsixlangpack");
        assert!(builder.files().contains("/extension.vsixmanifest"));
    }

    #[test]
    fn test_single_value_conflict_and_override() {
        let mut builder = builder();
        builder
            .single_value(schema::IDENTITY_VERSION, "1.0.0", false, "version")
            .unwrap();
        builder
            .single_value(schema::IDENTITY_VERSION, "1.0.0", false, "version")
            .unwrap();

        let err = builder
            .single_value(schema::IDENTITY_VERSION, "2.0.0", false, "version")
            .unwrap_err();
        assert!(matches!(err, ManifestError::Conflict { .. }));

        builder
            .single_value(schema::IDENTITY_VERSION, "2.0.0", true, "version")
            .unwrap();
        assert_eq!(
            builder.document().get_str(schema::IDENTITY_VERSION),
            Some("2.0.0")
        );
    }

    #[test]
    fn test_add_property_appends() {
        let mut builder = builder();
        builder.add_property("A", "1");
        builder.add_property("B", "2");
        let props = builder.document().array(schema::PROPERTIES);
        assert_eq!(props.len(), 2);
        assert_eq!(props[1]["$"]["Id"], "B");
        assert_eq!(props[1]["$"]["Value"], "2");
    }

    #[test]
    fn test_add_asset_to_manifest_sets_icon_pointer() {
        let mut builder = builder();
        builder.add_asset_to_manifest("/img/icon.png", schema::DEFAULT_ICON_ASSET, true, None);

        assert_eq!(builder.document().get_str(schema::ICON), Some("img/icon.png"));
        let assets = builder.document().array(schema::ASSETS);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0]["$"]["Path"], "img/icon.png");
        assert_eq!(assets[0]["$"]["d:Source"], "File");
        assert_eq!(assets[0]["$"]["Addressable"], "true");
    }

    #[test]
    fn test_validate_sees_registered_assets() {
        let mut builder = builder();
        for path in ["a.png", "b.png"] {
            builder
                .add_file(
                    FileDeclaration::from_path(path)
                        .with_asset_type("Same.Type")
                        .addressable(true),
                )
                .unwrap();
        }

        let duplicates: Vec<String> = builder
            .validate()
            .into_iter()
            .filter(|v| v.contains("Same.Type"))
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].contains("a.png"));
        assert!(duplicates[0].contains("b.png"));
        // Validation does not write the assets.
        assert!(builder.document().array(schema::ASSETS).is_empty());
    }

    #[tokio::test]
    async fn test_finalize_writes_assets_and_content_types() {
        let mut builder = builder();
        builder
            .add_file(
                FileDeclaration::from_path("images/logo.png")
                    .with_asset_type(schema::DEFAULT_ICON_ASSET)
                    .addressable(true),
            )
            .unwrap();
        builder.add_file(FileDeclaration::from_path("LICENSE")).unwrap();

        builder.finalize().await.unwrap();

        let assets = builder.document().array(schema::ASSETS);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0]["$"]["Path"], "images/logo.png");
        assert_eq!(builder.document().get_str(schema::ICON), Some("images/logo.png"));

        let fragment = builder.content_types().unwrap();
        assert_eq!(fragment.overrides.len(), 3);
        assert_eq!(
            fragment.override_for("/extension.vsixmanifest"),
            Some("text/xml")
        );
        assert_eq!(fragment.override_for("/images/logo.png"), Some("image/png"));
        assert_eq!(fragment.override_for("/LICENSE"), Some(OCTET_STREAM));

        let part = builder.files().get("/[Content_Types].xml").unwrap();
        assert!(matches!(part.source, crate::package::FileSource::Inline(_)));
        assert_eq!(
            builder
                .files()
                .iter()
                .filter(|f| f.part_name == "/[Content_Types].xml")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_finalize_adds_default_target() {
        let mut builder = builder();
        builder.finalize().await.unwrap();
        let targets = builder.document().array(schema::INSTALLATION_TARGETS);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0]["$"]["Id"], "Microsoft.VisualStudio.Services");
    }

    #[tokio::test]
    async fn test_finalize_without_default_target() {
        let mut builder = ManifestBuilder::with_resolver(
            BuilderConfig::new("/ext").with_default_target(None),
            Box::new(TableResolver),
        );
        builder.finalize().await.unwrap();
        assert!(builder.document().array(schema::INSTALLATION_TARGETS).is_empty());
    }

    #[tokio::test]
    async fn test_finalize_runs_once() {
        let mut builder = builder();
        builder.finalize().await.unwrap();

        assert!(matches!(
            builder.finalize().await,
            Err(ManifestError::AlreadyFinalized)
        ));
        assert!(matches!(
            builder.add_file(FileDeclaration::from_path("late.js")),
            Err(ManifestError::AlreadyFinalized)
        ));
    }

    #[tokio::test]
    async fn test_finalize_propagates_resolution_failure() {
        let mut builder = ManifestBuilder::with_resolver(
            BuilderConfig::new("/ext"),
            Box::new(FailingResolver::new(1)),
        );
        builder
            .add_file(
                FileDeclaration::from_path("data/x.bin")
                    .with_asset_type("Contoso.Data")
                    .addressable(true),
            )
            .unwrap();

        let err = builder.finalize().await.unwrap_err();
        assert!(matches!(err, ManifestError::ContentType(_)));

        // Nothing was committed.
        assert!(!builder.is_finalized());
        assert!(builder.content_types().is_none());
        assert!(builder.document().array(schema::ASSETS).is_empty());
        assert!(builder.document().array(schema::INSTALLATION_TARGETS).is_empty());
        assert!(builder
            .files()
            .iter()
            .all(|f| f.content_type.as_deref() != Some("text/x-partial")));
        assert!(builder.files().get(ContentTypeFragment::PART_NAME).is_none());

        // A retry is allowed and completes the manifest.
        builder.finalize().await.unwrap();
        assert!(builder.is_finalized());
        assert_eq!(builder.document().array(schema::ASSETS).len(), 1);
        assert_eq!(builder.document().array(schema::INSTALLATION_TARGETS).len(), 1);
        assert!(builder.files().get(ContentTypeFragment::PART_NAME).is_some());
    }

    #[test]
    fn test_validate_accounts_for_default_target() {
        let builder = builder();
        assert!(!builder
            .validate()
            .iter()
            .any(|v| v.contains("installation target")));
        assert!(builder.document().array(schema::INSTALLATION_TARGETS).is_empty());

        let builder = ManifestBuilder::with_resolver(
            BuilderConfig::new("/ext").with_default_target(None),
            Box::new(TableResolver),
        );
        assert!(builder
            .validate()
            .iter()
            .any(|v| v.contains("installation target")));
    }

    #[test]
    fn test_get_loc_result_falls_back_to_defaults() {
        let builder = builder();
        let defaults: HashMap<String, String> = [
            ("displayName", "Name"),
            ("description", "Default description"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let xml = builder.get_loc_result(&HashMap::new(), &defaults).unwrap();
        assert!(xml.contains("Default description"));

        let translations: HashMap<String, String> =
            [("description".to_string(), "Beschreibung".to_string())].into();
        let xml = builder.get_loc_result(&translations, &defaults).unwrap();
        assert!(xml.contains("Beschreibung"));
        assert!(!xml.contains("Default description"));
        assert!(xml.contains("<DisplayName>Name</DisplayName>"));

        // The builder's own document is untouched.
        assert!(builder.document().get(schema::DESCRIPTION).is_none());
    }

    #[test]
    fn test_merge_delimited() {
        assert_eq!(merge_delimited(None, &["a".to_string()], ","), "a");
        assert_eq!(
            merge_delimited(Some("Preview  Paid"), &["Public".to_string()], " "),
            "Preview Paid Public"
        );
        assert_eq!(merge_delimited(Some(",a,,b,"), &[], ","), "a,b");
    }

    proptest! {
        #[test]
        fn prop_merge_delimited_has_no_duplicates(
            existing in proptest::collection::vec("[a-z]{1,4}", 0..6),
            added in proptest::collection::vec("[a-z]{1,4}", 0..6),
        ) {
            let joined = existing.join(",");
            let merged = merge_delimited(Some(&joined), &added, ",");
            let items: Vec<&str> = merged.split(',').filter(|s| !s.is_empty()).collect();

            let mut unique = items.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), items.len());

            for item in existing.iter().chain(added.iter()) {
                prop_assert!(items.contains(&item.as_str()));
            }
        }

        #[test]
        fn prop_merge_delimited_is_idempotent(
            items in proptest::collection::vec("[a-z]{1,4}", 0..6),
        ) {
            let once = merge_delimited(None, &items, " ");
            let twice = merge_delimited(Some(&once), &items, " ");
            prop_assert_eq!(once, twice);
        }
    }
}
