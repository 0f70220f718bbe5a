//! Per-extension resolution against a file-association registry.

use std::collections::HashMap;

use futures::future::join_all;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{
    builtin_content_type, BoxFuture, ContentTypeError, ContentTypeResolver, ContentTypeResult,
    DefaultEntry, OCTET_STREAM,
};
use crate::package::{extension_of, FileSet};

/// An authoritative source of extension → content type associations.
pub trait ExtensionRegistry: Send + Sync {
    /// Look up the content type registered for an extension (with leading dot).
    ///
    /// Returns `Ok(None)` when the extension has no registered content type.
    fn lookup<'a>(&'a self, extension: &'a str) -> BoxFuture<'a, ContentTypeResult<Option<String>>>;
}

/// The Windows `HKEY_CLASSES_ROOT` hive, queried with `reg query`.
#[derive(Debug, Clone)]
pub struct WindowsRegistry {
    command: String,
}

impl WindowsRegistry {
    /// Create a registry client using the given query command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ExtensionRegistry for WindowsRegistry {
    fn lookup<'a>(&'a self, extension: &'a str) -> BoxFuture<'a, ContentTypeResult<Option<String>>> {
        Box::pin(async move {
            let output = Command::new(&self.command)
                .arg("query")
                .arg(format!("HKCR\\{}", extension))
                .arg("/v")
                .arg("Content Type")
                .output()
                .await
                .map_err(|source| ContentTypeError::Spawn {
                    command: self.command.clone(),
                    source,
                })?;

            // A missing key or value exits non-zero.
            if !output.status.success() {
                return Ok(None);
            }

            Ok(parse_reg_query(&String::from_utf8_lossy(&output.stdout)))
        })
    }
}

/// Extract the value of a `REG_SZ` entry from `reg query` output.
///
/// # Examples
///
/// ```
/// use extpack::content_types::parse_reg_query;
///
/// let output = "\r\nHKEY_CLASSES_ROOT\\.png\r\n    Content Type    REG_SZ    image/png\r\n";
/// assert_eq!(parse_reg_query(output), Some("image/png".to_string()));
/// assert_eq!(parse_reg_query("ERROR: not found"), None);
/// ```
pub fn parse_reg_query(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.split_once("REG_SZ"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves one content type per distinct extension.
///
/// Extensions in the built-in table never reach the registry. All remaining
/// lookups run concurrently; failures and missing registrations fall back to
/// `application/octet-stream`.
pub struct RegistryResolver<R> {
    registry: R,
}

impl<R: ExtensionRegistry> RegistryResolver<R> {
    /// Create a resolver backed by a registry.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    async fn resolve_files(&self, files: &mut FileSet) -> ContentTypeResult<Vec<DefaultEntry>> {
        let mut extensions: Vec<String> = Vec::new();
        for file in files.iter_mut().filter(|f| f.content_type.is_none()) {
            match extension_of(&file.part_name) {
                Some(ext) => {
                    if !extensions.contains(&ext) {
                        extensions.push(ext);
                    }
                }
                None => {
                    warn!(
                        part_name = %file.part_name,
                        "File has no extension, using {}", OCTET_STREAM
                    );
                    file.content_type = Some(OCTET_STREAM.to_string());
                }
            }
        }

        let pending: Vec<&String> = extensions
            .iter()
            .filter(|ext| builtin_content_type(ext).is_none())
            .collect();
        let lookups = join_all(pending.iter().map(|ext| self.registry.lookup(ext))).await;

        let mut looked_up: HashMap<&str, String> = HashMap::new();
        for (ext, result) in pending.iter().zip(lookups) {
            let content_type = match result {
                Ok(Some(content_type)) => content_type,
                Ok(None) => {
                    warn!(extension = %ext, "No content type registered, using {}", OCTET_STREAM);
                    OCTET_STREAM.to_string()
                }
                Err(e) => {
                    warn!(extension = %ext, error = %e, "Registry lookup failed, using {}", OCTET_STREAM);
                    OCTET_STREAM.to_string()
                }
            };
            looked_up.insert(ext.as_str(), content_type);
        }

        let defaults = extensions
            .iter()
            .map(|ext| {
                let content_type = builtin_content_type(ext)
                    .map(str::to_string)
                    .or_else(|| looked_up.get(ext.as_str()).cloned())
                    .unwrap_or_else(|| OCTET_STREAM.to_string());
                debug!(extension = %ext, content_type = %content_type, "Resolved extension");
                DefaultEntry::new(ext.clone(), content_type)
            })
            .collect();

        Ok(defaults)
    }
}

impl<R: ExtensionRegistry> ContentTypeResolver for RegistryResolver<R> {
    fn resolve<'a>(
        &'a self,
        files: &'a mut FileSet,
    ) -> BoxFuture<'a, ContentTypeResult<Vec<DefaultEntry>>> {
        Box::pin(self.resolve_files(files))
    }
}
