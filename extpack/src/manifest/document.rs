//! The manifest document tree and dotted-path addressing.

use serde_json::{json, Map, Value};

use super::schema;

/// One step of a [`DocPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

/// A parsed dotted path such as `PackageManifest.Metadata[0].Identity[0].$.Id`.
///
/// Dots separate object keys; `[n]` suffixes index into arrays. A segment
/// whose brackets do not hold a number is taken as a literal key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath {
    segments: Vec<Segment>,
}

impl DocPath {
    /// Parse a dotted path.
    ///
    /// # Examples
    ///
    /// ```
    /// use extpack::manifest::{DocPath, Segment};
    ///
    /// let path = DocPath::parse("Root.Items[2].$.Id");
    /// assert_eq!(
    ///     path.segments(),
    ///     &[
    ///         Segment::Key("Root".to_string()),
    ///         Segment::Key("Items".to_string()),
    ///         Segment::Index(2),
    ///         Segment::Key("$".to_string()),
    ///         Segment::Key("Id".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        for part in path.split('.').filter(|p| !p.is_empty()) {
            match split_indices(part) {
                Some((key, indices)) => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(key.to_string()));
                    }
                    segments.extend(indices.into_iter().map(Segment::Index));
                }
                None => segments.push(Segment::Key(part.to_string())),
            }
        }
        Self { segments }
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Split `Name[0][1]` into `("Name", [0, 1])`; `None` if there are no
/// well-formed index suffixes.
fn split_indices(part: &str) -> Option<(&str, Vec<usize>)> {
    let open = part.find('[')?;
    let (key, mut rest) = part.split_at(open);
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indices.push(inner[..close].parse().ok()?);
        rest = &inner[close + 1..];
    }
    Some((key, indices))
}

/// The manifest under construction.
///
/// Writes create missing intermediate objects and arrays on the way (arrays
/// are padded with nulls). Reads of missing paths return `None`, and a `null`
/// value reads as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    root: Value,
}

impl Default for ManifestDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestDocument {
    /// Create the initial manifest skeleton.
    pub fn new() -> Self {
        let root = json!({
            "PackageManifest": {
                "$": {
                    "Version": schema::MANIFEST_VERSION,
                    "xmlns": schema::VSX_NAMESPACE,
                    "xmlns:d": schema::VSX_DESIGN_NAMESPACE,
                },
                "Metadata": [{
                    "Identity": [{ "$": { "Language": schema::DEFAULT_LANGUAGE } }]
                }],
                "Dependencies": [""],
            }
        });
        Self { root }
    }

    /// Wrap an existing tree.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Read the value at a path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in DocPath::parse(path).segments() {
            current = match segment {
                Segment::Key(key) => current.as_object()?.get(key)?,
                Segment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        (!current.is_null()).then_some(current)
    }

    /// Read a string at a path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Elements of the array at a path; empty if missing or not an array.
    pub fn array(&self, path: &str) -> &[Value] {
        self.get(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Write a value at a path, creating the path as needed.
    pub fn set(&mut self, path: &str, value: Value) {
        *self.entry(path) = value;
    }

    /// Append to the array at a path, creating it as needed.
    pub fn push(&mut self, path: &str, value: Value) {
        let slot = self.entry(path);
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(value);
        }
    }

    /// Mutable slot at a path, creating missing containers on the way.
    fn entry(&mut self, path: &str) -> &mut Value {
        let mut current = &mut self.root;
        for segment in DocPath::parse(path).segments() {
            current = match segment {
                Segment::Key(key) => {
                    if !current.is_object() {
                        *current = Value::Object(Map::new());
                    }
                    &mut current[key.as_str()]
                }
                Segment::Index(index) => {
                    if let Value::Array(items) = &mut *current {
                        if items.len() <= *index {
                            items.resize(index + 1, Value::Null);
                        }
                    } else {
                        *current = Value::Array(vec![Value::Null; index + 1]);
                    }
                    &mut current[*index]
                }
            };
        }
        current
    }

    /// The raw tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// The tree with manifest elements in schema order.
    ///
    /// Keys are kept in insertion order while building, so the order of
    /// `process_key` calls would otherwise leak into the output.
    pub fn ordered(&self) -> Value {
        let mut root = self.root.clone();
        if let Some(Value::Object(manifest)) = root.get_mut(schema::ROOT_ELEMENT) {
            if let Some(Value::Array(metadata)) = manifest.get_mut(schema::METADATA_ELEMENT) {
                for item in metadata.iter_mut() {
                    if let Value::Object(map) = item {
                        reorder(map, schema::METADATA_ORDER);
                    }
                }
            }
            reorder(manifest, schema::ROOT_ORDER);
        }
        root
    }
}

/// Move the listed keys to the front in the given order; others follow in
/// their existing order.
fn reorder(map: &mut Map<String, Value>, order: &[&str]) {
    let mut listed: Vec<Option<Value>> = vec![None; order.len()];
    let mut rest = Map::new();
    for (key, value) in std::mem::take(map) {
        match order.iter().position(|k| *k == key) {
            Some(index) => listed[index] = Some(value),
            None => {
                rest.insert(key, value);
            }
        }
    }
    for (key, value) in order.iter().zip(listed) {
        if let Some(value) = value {
            map.insert((*key).to_string(), value);
        }
    }
    map.extend(rest);
}
