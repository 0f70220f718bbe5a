//! Routing of configuration keys onto the manifest.
//!
//! Each recognized key family is a [`ManifestKey`] variant with its own
//! handler. Keys are matched case-insensitively; anything else is ignored so
//! that newer configuration files keep working with older builders.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::branding::normalize_color;
use super::builder::{split_delimited, ManifestBuilder};
use super::error::{ManifestError, ManifestResult};
use super::schema;
use super::text::{capitalize_key, start_case};
use crate::package::{clean_part_name, to_zip_item_name, FileDeclaration};
use crate::xml::scalar_text;

/// A recognized configuration key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKey {
    Id,
    Version,
    Name,
    Description,
    Publisher,
    ReleaseNotes,
    Icons,
    Screenshots,
    Details,
    Content,
    Targets,
    Links,
    Repository,
    Badges,
    Branding,
    CustomerQnASupport,
    GitHubFlavoredMarkdown,
    Files,
    Tags,
    GalleryFlags,
    Categories,
    Public,
}

impl ManifestKey {
    /// Parse a configuration key, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use extpack::manifest::ManifestKey;
    ///
    /// assert_eq!(ManifestKey::parse("extensionId"), Some(ManifestKey::Id));
    /// assert_eq!(ManifestKey::parse("GALLERYFLAGS"), Some(ManifestKey::GalleryFlags));
    /// assert_eq!(ManifestKey::parse("somethingElse"), None);
    /// ```
    pub fn parse(key: &str) -> Option<Self> {
        let key = match key.to_lowercase().as_str() {
            "namespace" | "extensionid" | "id" => ManifestKey::Id,
            "version" => ManifestKey::Version,
            "name" => ManifestKey::Name,
            "description" => ManifestKey::Description,
            "publisher" => ManifestKey::Publisher,
            "releasenotes" => ManifestKey::ReleaseNotes,
            "icons" => ManifestKey::Icons,
            "screenshots" => ManifestKey::Screenshots,
            "details" => ManifestKey::Details,
            "content" => ManifestKey::Content,
            "targets" => ManifestKey::Targets,
            "links" => ManifestKey::Links,
            "repository" => ManifestKey::Repository,
            "badges" => ManifestKey::Badges,
            "branding" => ManifestKey::Branding,
            "customerqnasupport" => ManifestKey::CustomerQnASupport,
            "githubflavoredmarkdown" => ManifestKey::GitHubFlavoredMarkdown,
            "files" => ManifestKey::Files,
            "tags" => ManifestKey::Tags,
            "galleryflags" => ManifestKey::GalleryFlags,
            "categories" => ManifestKey::Categories,
            "public" => ManifestKey::Public,
            _ => return None,
        };
        Some(key)
    }
}

impl ManifestBuilder {
    /// Apply one configuration key to the manifest.
    ///
    /// With `override_allowed` false, single-value fields that already hold a
    /// different value produce [`ManifestError::Conflict`]. Unrecognized keys
    /// are ignored.
    pub fn process_key(
        &mut self,
        key: &str,
        value: &Value,
        override_allowed: bool,
    ) -> ManifestResult<()> {
        let Some(manifest_key) = ManifestKey::parse(key) else {
            debug!(key, "Ignoring unrecognized manifest key");
            return Ok(());
        };
        debug!(key, ?manifest_key, "Processing manifest key");

        match manifest_key {
            ManifestKey::Id => {
                if let Some(id) = self.scalar(key, value) {
                    let id = id.replace('.', "-");
                    self.single_value(schema::IDENTITY_ID, &id, override_allowed, key)?;
                }
            }
            ManifestKey::Version => {
                self.scalar_field(key, value, schema::IDENTITY_VERSION, override_allowed)?
            }
            ManifestKey::Name => {
                self.scalar_field(key, value, schema::DISPLAY_NAME, override_allowed)?
            }
            ManifestKey::Publisher => {
                self.scalar_field(key, value, schema::IDENTITY_PUBLISHER, override_allowed)?
            }
            ManifestKey::ReleaseNotes => {
                self.scalar_field(key, value, schema::RELEASE_NOTES, override_allowed)?
            }
            ManifestKey::Description => {
                if let Some(description) = self.scalar(key, value) {
                    self.single_value(schema::DESCRIPTION, &description, override_allowed, key)?;
                    self.document.set(schema::DESCRIPTION_SPACE, json!("preserve"));
                }
            }
            ManifestKey::Icons => self.process_icons(key, value, override_allowed)?,
            ManifestKey::Screenshots => self.process_screenshots(key, value)?,
            ManifestKey::Details => {
                match asset_declaration(value) {
                    Some(decl) => self.add_file(
                        decl.with_asset_type(schema::DETAILS_ASSET).addressable(true),
                    )?,
                    None => warn!(key, "Details page has no path, skipping"),
                }
            }
            ManifestKey::Content => self.process_content(key, value)?,
            ManifestKey::Targets => self.process_targets(key, value)?,
            ManifestKey::Links => self.process_links(key, value)?,
            ManifestKey::Repository => self.process_repository(key, value)?,
            ManifestKey::Badges => self.process_badges(key, value)?,
            ManifestKey::Branding => self.process_branding(key, value)?,
            ManifestKey::CustomerQnASupport => self.process_qna(key, value)?,
            ManifestKey::GitHubFlavoredMarkdown => match value {
                Value::Bool(enabled) => {
                    self.add_property(schema::GFM_PROPERTY, &enabled.to_string())
                }
                _ => return Err(ManifestError::invalid_value(key, "expected true or false")),
            },
            ManifestKey::Files => self.process_files(key, value)?,
            ManifestKey::Tags => {
                let items = delimited_items(key, value, ",")?;
                self.delimited_list(schema::TAGS, &items, ",");
            }
            ManifestKey::GalleryFlags => {
                let items = delimited_items(key, value, " ")?;
                self.delimited_list(schema::GALLERY_FLAGS, &items, " ");
            }
            ManifestKey::Categories => {
                let items = delimited_items(key, value, ",")?;
                self.delimited_list(schema::CATEGORIES, &items, ",");
            }
            ManifestKey::Public => match value {
                Value::Bool(public) => self.set_public(*public),
                _ => return Err(ManifestError::invalid_value(key, "expected true or false")),
            },
        }
        Ok(())
    }

    /// Scalar text of a value; non-scalars are skipped with a warning.
    fn scalar(&self, key: &str, value: &Value) -> Option<String> {
        let text = scalar_text(value);
        if text.is_none() {
            warn!(key, "Expected a scalar value, ignoring");
        }
        text
    }

    fn scalar_field(
        &mut self,
        key: &str,
        value: &Value,
        path: &str,
        override_allowed: bool,
    ) -> ManifestResult<()> {
        match self.scalar(key, value) {
            Some(text) => self.single_value(path, &text, override_allowed, key),
            None => Ok(()),
        }
    }

    fn process_icons(
        &mut self,
        key: &str,
        value: &Value,
        override_allowed: bool,
    ) -> ManifestResult<()> {
        for (role, path) in expect_object(key, value)? {
            let Some(path) = path.as_str() else {
                warn!(key, role = %role, "Icon path must be a string, skipping");
                continue;
            };
            let part_name = path.replace('\\', "/");
            if role.eq_ignore_ascii_case("default") {
                let pointer = to_zip_item_name(&clean_part_name(&part_name)).to_string();
                self.single_value(schema::ICON, &pointer, override_allowed, "icons.default")?;
            }
            self.add_file(
                FileDeclaration::from_path(path)
                    .with_part_name(part_name)
                    .with_asset_type(format!("{}{}", schema::ICONS_ASSET_PREFIX, start_case(role)))
                    .addressable(true),
            )?;
        }
        Ok(())
    }

    fn process_screenshots(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for (index, screenshot) in expect_array(key, value)?.iter().enumerate() {
            let Some(decl) = asset_declaration(screenshot) else {
                warn!(key, index, "Screenshot has no path, skipping");
                continue;
            };
            self.add_file(
                decl.with_asset_type(format!("{}{}", schema::SCREENSHOTS_ASSET_PREFIX, index + 1))
                    .addressable(true),
            )?;
        }
        Ok(())
    }

    fn process_content(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for (kind, entry) in expect_object(key, value)? {
            let Some(decl) = asset_declaration(entry) else {
                warn!(key, kind = %kind, "Content entry has no path, skipping");
                continue;
            };
            self.add_file(
                decl.with_asset_type(format!("{}{}", schema::CONTENT_ASSET_PREFIX, start_case(kind)))
                    .addressable(true),
            )?;
        }
        Ok(())
    }

    fn process_targets(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for target in expect_array(key, value)? {
            let Some(id) = target.get("id").and_then(scalar_text) else {
                warn!(key, "Installation target has no id, skipping");
                continue;
            };
            let mut attrs = Map::new();
            attrs.insert("Id".to_string(), json!(id));
            if let Some(version) = target.get("version").and_then(scalar_text) {
                attrs.insert("Version".to_string(), json!(version));
            }
            self.document
                .push(schema::INSTALLATION_TARGETS, json!({ "$": Value::Object(attrs) }));
        }
        Ok(())
    }

    fn process_links(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for (link_type, link) in expect_object(key, value)? {
            let uri = link
                .get("uri")
                .or_else(|| link.get("url"))
                .and_then(Value::as_str);
            match uri {
                Some(uri) => self.add_property(
                    &format!("{}{}", schema::LINKS_PROPERTY_PREFIX, capitalize_key(link_type)),
                    uri,
                ),
                None => warn!(key, link_type = %link_type, "Link has no uri, dropping it"),
            }
        }
        Ok(())
    }

    fn process_repository(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        let repository = expect_object(key, value)?;
        let repo_type = repository
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::invalid_value(key, "repository type is required"))?;
        if !repo_type.eq_ignore_ascii_case("git") {
            return Err(ManifestError::invalid_value(
                key,
                format!("unsupported repository type '{}'; only git is supported", repo_type),
            ));
        }
        let url = repository
            .get("url")
            .or_else(|| repository.get("uri"))
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::invalid_value(key, "repository url is required"))?;

        self.add_property(schema::GITHUB_LINK_PROPERTY, url);
        Ok(())
    }

    fn process_badges(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for badge in expect_array(key, value)? {
            let link = badge
                .get("link")
                .or_else(|| badge.get("href"))
                .and_then(Value::as_str);
            let img_uri = badge.get("imgUri").and_then(Value::as_str);
            let (Some(link), Some(img_uri)) = (link, img_uri) else {
                warn!(key, "Badge needs a link and an imgUri, skipping");
                continue;
            };
            let description = badge
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            self.document.push(
                schema::BADGES,
                json!({ "$": { "Link": link, "ImgUri": img_uri, "Description": description } }),
            );
        }
        Ok(())
    }

    fn process_branding(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for (branding_key, branding_value) in expect_object(key, value)? {
            let Some(text) = scalar_text(branding_value) else {
                warn!(key, branding_key = %branding_key, "Branding value must be a scalar, skipping");
                continue;
            };
            let text = if branding_key.eq_ignore_ascii_case("color") {
                normalize_color(&text).ok_or(ManifestError::InvalidColor(text))?
            } else {
                text
            };
            self.add_property(
                &format!("{}{}", schema::BRANDING_PROPERTY_PREFIX, capitalize_key(branding_key)),
                &text,
            );
        }
        Ok(())
    }

    fn process_qna(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        let support = expect_object(key, value)?;
        if let Some(enabled) = support.get("enableMarketplaceQnA") {
            match enabled {
                Value::Bool(enabled) => {
                    self.add_property(schema::ENABLE_QNA_PROPERTY, &enabled.to_string())
                }
                _ => {
                    return Err(ManifestError::invalid_value(
                        key,
                        "enableMarketplaceQnA must be true or false",
                    ))
                }
            }
        }
        if let Some(url) = support.get("url").and_then(Value::as_str) {
            self.add_property(schema::QNA_LINK_PROPERTY, url);
        }
        Ok(())
    }

    fn process_files(&mut self, key: &str, value: &Value) -> ManifestResult<()> {
        for file in expect_array(key, value)? {
            let decl: FileDeclaration = serde_json::from_value(file.clone())
                .map_err(|e| ManifestError::invalid_value(key, e.to_string()))?;
            self.add_file(decl)?;
        }
        Ok(())
    }

    /// Add or remove the `Public` gallery flag, keeping the other flags.
    fn set_public(&mut self, public: bool) {
        if public {
            self.delimited_list(schema::GALLERY_FLAGS, &[schema::PUBLIC_FLAG.to_string()], " ");
            return;
        }
        let remaining: Vec<String> = self
            .document
            .get_str(schema::GALLERY_FLAGS)
            .map(|flags| split_delimited(flags, " "))
            .unwrap_or_default()
            .into_iter()
            .filter(|flag| flag != schema::PUBLIC_FLAG)
            .collect();

        let flags = if remaining.is_empty() {
            Value::Null
        } else {
            json!(remaining.join(" "))
        };
        self.document.set(schema::GALLERY_FLAGS, flags);
    }
}

fn expect_object<'a>(key: &str, value: &'a Value) -> ManifestResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ManifestError::invalid_value(key, "expected an object"))
}

fn expect_array<'a>(key: &str, value: &'a Value) -> ManifestResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ManifestError::invalid_value(key, "expected a list"))
}

/// Declaration for an `{ path, contentType? }` object; `None` without a path.
fn asset_declaration(value: &Value) -> Option<FileDeclaration> {
    let path = value.get("path")?.as_str()?;
    let content_type = value
        .get("contentType")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(
        FileDeclaration::from_path(path)
            .with_part_name(path.replace('\\', "/"))
            .with_content_type(content_type),
    )
}

/// Items of a delimited list given as a string or a list of scalars.
fn delimited_items(key: &str, value: &Value, delimiter: &str) -> ManifestResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(split_delimited(s, delimiter)),
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(scalar_text)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()),
        _ => Err(ManifestError::invalid_value(key, "expected a string or a list")),
    }
}
