//! Manifest validation rules.
//!
//! Validation is a read-only pass over a [`ManifestDocument`]: each rule reads
//! one document path and may produce a message. Violations are collected and
//! returned; they never abort anything.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::document::ManifestDocument;
use super::schema;

/// Categories accepted by the marketplace.
pub const VALID_CATEGORIES: &[&str] = &[
    "Azure Repos",
    "Azure Boards",
    "Azure Pipelines",
    "Azure Test Plans",
    "Azure Artifacts",
    "Build and release",
    "Code",
    "Collaborate",
    "Insights",
    "Integrate",
    "Plan and track",
    "Planning",
    "Test",
    "Testing",
    "Developer samples",
];

/// A check of the value at one document path.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    /// Path of the checked value.
    pub path: &'static str,

    /// Returns a message when the value (or its absence) is invalid.
    pub check: fn(Option<&Value>) -> Option<String>,
}

/// All rules, in reporting order.
pub const RULES: &[ValidationRule] = &[
    ValidationRule {
        path: schema::IDENTITY_ID,
        check: check_id,
    },
    ValidationRule {
        path: schema::IDENTITY_VERSION,
        check: check_version,
    },
    ValidationRule {
        path: schema::DISPLAY_NAME,
        check: check_display_name,
    },
    ValidationRule {
        path: schema::IDENTITY_PUBLISHER,
        check: check_publisher,
    },
    ValidationRule {
        path: schema::INSTALLATION_TARGETS,
        check: check_targets,
    },
    ValidationRule {
        path: schema::CATEGORIES,
        check: check_categories,
    },
    ValidationRule {
        path: schema::ASSETS,
        check: check_asset_paths,
    },
    ValidationRule {
        path: schema::ASSETS,
        check: check_addressable_assets,
    },
];

/// Run every rule against a document.
pub fn validate(document: &ManifestDocument) -> Vec<String> {
    RULES
        .iter()
        .filter_map(|rule| (rule.check)(document.get(rule.path)))
        .collect()
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap())
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn check_id(value: Option<&Value>) -> Option<String> {
    match value.and_then(Value::as_str) {
        Some(id) if id_pattern().is_match(id) => None,
        Some(id) => Some(format!(
            "Extension id '{}' is invalid. It may only contain letters, numbers, underscores and dashes.",
            id
        )),
        None => Some("Extension id is required.".to_string()),
    }
}

fn check_version(value: Option<&Value>) -> Option<String> {
    (!non_empty_str(value)).then(|| "Extension version is required.".to_string())
}

fn check_display_name(value: Option<&Value>) -> Option<String> {
    (!non_empty_str(value)).then(|| "Extension name is required.".to_string())
}

fn check_publisher(value: Option<&Value>) -> Option<String> {
    (!non_empty_str(value)).then(|| "Extension publisher is required.".to_string())
}

fn check_targets(value: Option<&Value>) -> Option<String> {
    let count = value.and_then(Value::as_array).map_or(0, |targets| {
        targets.iter().filter(|t| !t.is_null()).count()
    });
    (count == 0).then(|| "At least one installation target must be specified.".to_string())
}

fn check_categories(value: Option<&Value>) -> Option<String> {
    let raw = value.and_then(Value::as_str)?;
    let categories: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if categories.len() > 1 {
        return Some(format!(
            "Extensions are limited to a single category; found {}.",
            categories.join(", ")
        ));
    }

    let invalid: Vec<&str> = categories
        .into_iter()
        .filter(|c| !VALID_CATEGORIES.contains(c))
        .collect();
    if invalid.is_empty() {
        return None;
    }
    Some(format!(
        "Invalid category: {}. Valid categories are: {}.",
        invalid.join(", "),
        VALID_CATEGORIES.join(", ")
    ))
}

fn asset_attr<'a>(asset: &'a Value, name: &str) -> Option<&'a str> {
    asset.get("$")?.get(name)?.as_str()
}

fn check_asset_paths(value: Option<&Value>) -> Option<String> {
    let assets = value.and_then(Value::as_array)?;
    let missing: Vec<&str> = assets
        .iter()
        .filter(|asset| asset_attr(asset, "Path").map_or(true, |p| p.trim().is_empty()))
        .map(|asset| asset_attr(asset, "Type").unwrap_or("(unknown type)"))
        .collect();
    if missing.is_empty() {
        return None;
    }
    Some(format!(
        "Every asset must have a path; missing for: {}.",
        missing.join(", ")
    ))
}

fn check_addressable_assets(value: Option<&Value>) -> Option<String> {
    let assets = value.and_then(Value::as_array)?;
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for asset in assets {
        if asset_attr(asset, "Addressable") != Some("true") {
            continue;
        }
        let Some(asset_type) = asset_attr(asset, "Type") else {
            continue;
        };
        let path = asset_attr(asset, "Path").unwrap_or_default();

        if let Some(first) = seen.get(asset_type) {
            return Some(format!(
                "Cannot have multiple addressable assets with the same type '{}': '{}' and '{}'.",
                asset_type, first, path
            ));
        }
        seen.insert(asset_type, path);
    }
    None
}
