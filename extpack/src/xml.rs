//! XML serialization of xml2js-shaped document trees.
//!
//! Documents are `serde_json::Value` trees using the xml2js conventions:
//!
//! ```text
//! { "Root": {                     <Root a="1">
//!     "$": { "a": "1" },            <Child>text</Child>
//!     "Child": ["text"],            <Child b="2"/>
//!     "Other": [{ "$": {"b": "2"} }]
//! } }                             </Root>
//! ```
//!
//! - `$` holds the attributes of an element
//! - `_` holds its text content
//! - every other key is a child element; arrays repeat the element
//! - scalars become text-only elements, empty strings become empty elements
//! - `null` values are skipped

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key holding the attributes of an element.
pub const ATTRIBUTES_KEY: &str = "$";

/// Key holding the text content of an element.
pub const TEXT_KEY: &str = "_";

/// Errors that can occur while serializing a document.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document root is not an object with exactly one element.
    #[error("document root must be an object with exactly one element")]
    InvalidRoot,

    /// The underlying writer failed.
    #[error("failed to write XML: {0}")]
    Write(String),

    /// The produced bytes are not UTF-8.
    #[error("generated XML is not valid UTF-8")]
    Utf8,
}

/// Serialize a document tree to indented XML text with an XML declaration.
pub fn to_xml(document: &Value) -> Result<String, XmlError> {
    let root = match document {
        Value::Object(map) if map.len() == 1 => map,
        _ => return Err(XmlError::InvalidRoot),
    };

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;

    for (name, node) in root {
        write_node(&mut writer, name, node)?;
    }

    String::from_utf8(writer.into_inner()).map_err(|_| XmlError::Utf8)
}

fn write_node(writer: &mut Writer<Vec<u8>>, name: &str, node: &Value) -> Result<(), XmlError> {
    match node {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                write_node(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => write_element(writer, name, map),
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            if text.is_empty() {
                emit(writer, Event::Empty(BytesStart::new(name)))
            } else {
                emit(writer, Event::Start(BytesStart::new(name)))?;
                emit(writer, Event::Text(BytesText::new(&text)))?;
                emit(writer, Event::End(BytesEnd::new(name)))
            }
        }
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    map: &Map<String, Value>,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(name);
    if let Some(Value::Object(attributes)) = map.get(ATTRIBUTES_KEY) {
        for (key, value) in attributes {
            if let Some(text) = scalar_text(value) {
                start.push_attribute((key.as_str(), text.as_str()));
            }
        }
    }

    let text = map
        .get(TEXT_KEY)
        .and_then(scalar_text)
        .filter(|t| !t.is_empty());
    let mut children = map
        .iter()
        .filter(|(key, _)| key.as_str() != ATTRIBUTES_KEY && key.as_str() != TEXT_KEY)
        .peekable();

    if text.is_none() && children.peek().is_none() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = text {
        emit(writer, Event::Text(BytesText::new(&text)))?;
    }
    for (child_name, child) in children {
        write_node(writer, child_name, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

/// Text form of a scalar value; `None` for null, arrays and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
