//! Centralized part naming conventions.
//!
//! This module is the single source of truth for how package paths are named:
//! - Part names (e.g., `/images/icon.png`) used as file set keys and in
//!   `[Content_Types].xml` overrides
//! - Zip item names (e.g., `images/icon.png`) used in manifest asset entries
//! - Extensions (e.g., `.png`) used for content-type defaults
//!
//! All other modules should use these functions rather than constructing names directly.

use std::path::{Component, Path};

/// Normalize a package path into a part name.
///
/// Backslashes become forward slashes, `./` segments and duplicate slashes
/// are dropped, `..` removes the preceding segment and never climbs above the
/// package root. The result always starts with `/`.
///
/// # Examples
///
/// ```
/// use extpack::package::clean_part_name;
///
/// assert_eq!(clean_part_name("images\\icon.png"), "/images/icon.png");
/// assert_eq!(clean_part_name("./README.md"), "/README.md");
/// assert_eq!(clean_part_name("../scripts/main.js"), "/scripts/main.js");
/// assert_eq!(clean_part_name("/[Content_Types].xml"), "/[Content_Types].xml");
/// ```
pub fn clean_part_name(name: &str) -> String {
    let normalized = name.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Strip the leading `/` of a part name to get the zip item name.
///
/// # Examples
///
/// ```
/// use extpack::package::to_zip_item_name;
///
/// assert_eq!(to_zip_item_name("/images/icon.png"), "images/icon.png");
/// assert_eq!(to_zip_item_name("images/icon.png"), "images/icon.png");
/// ```
pub fn to_zip_item_name(part_name: &str) -> &str {
    part_name.strip_prefix('/').unwrap_or(part_name)
}

/// Derive the part name of a source file from its location.
///
/// Paths inside `root` are made relative to it; anything else keeps its
/// normal components as given.
pub fn part_name_for_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    clean_part_name(&segments.join("/"))
}

/// Lowercased extension of a part name, including the leading dot.
///
/// Returns `None` for names without an extension, including dot-files such as
/// `.gitignore`.
///
/// # Examples
///
/// ```
/// use extpack::package::extension_of;
///
/// assert_eq!(extension_of("/images/Icon.PNG"), Some(".png".to_string()));
/// assert_eq!(extension_of("/LICENSE"), None);
/// assert_eq!(extension_of("/.gitignore"), None);
/// ```
pub fn extension_of(part_name: &str) -> Option<String> {
    Path::new(to_zip_item_name(part_name))
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_clean_part_name() {
        assert_eq!(clean_part_name("a/b.txt"), "/a/b.txt");
        assert_eq!(clean_part_name("a\\b\\c.js"), "/a/b/c.js");
        assert_eq!(clean_part_name("//a//./b.txt"), "/a/b.txt");
        assert_eq!(clean_part_name("/already/clean"), "/already/clean");
    }

    #[test]
    fn test_clean_part_name_parent_segments() {
        assert_eq!(clean_part_name("../x.js"), "/x.js");
        assert_eq!(clean_part_name("a/../../b/x.js"), "/b/x.js");
        assert_eq!(clean_part_name("a/b/../c.js"), "/a/c.js");
        assert!(!clean_part_name("..\\..\\x.js").contains(".."));
    }

    #[test]
    fn test_to_zip_item_name() {
        assert_eq!(to_zip_item_name("/a/b.txt"), "a/b.txt");
        assert_eq!(to_zip_item_name("a/b.txt"), "a/b.txt");
        assert_eq!(to_zip_item_name("/"), "");
    }

    #[test]
    fn test_part_name_for_path_inside_root() {
        let root = PathBuf::from("/work/ext");
        let path = root.join("images").join("icon.png");
        assert_eq!(part_name_for_path(&path, &root), "/images/icon.png");
    }

    #[test]
    fn test_part_name_for_path_outside_root() {
        let root = PathBuf::from("/work/ext");
        let path = PathBuf::from("docs/overview.md");
        assert_eq!(part_name_for_path(&path, &root), "/docs/overview.md");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/a/b.tar.gz"), Some(".gz".to_string()));
        assert_eq!(extension_of("/[Content_Types].xml"), Some(".xml".to_string()));
        assert_eq!(extension_of("/extension.vsixmanifest"), Some(".vsixmanifest".to_string()));
        assert_eq!(extension_of("/trailing."), None);
        assert_eq!(extension_of("/README"), None);
    }
}
