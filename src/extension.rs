//! Namespaced extension content and the pluggable capability that parses it.
//!
//! Every dialect grammar treats elements from foreign namespaces the same
//! way: it asks the injected [`ExtensionHandler`] whether the namespace is
//! recognized and, if so, hands the cursor over for the whole element. The
//! handler's internals are opaque to the dialect parsers — they only see the
//! updated [`Extensions`] accumulator or a fatal error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ParseError;
use crate::xml::{Node, XmlCursor};

/// Parsed extension content, keyed by namespace prefix and then element name.
pub type Extensions = BTreeMap<String, BTreeMap<String, Vec<Extension>>>;

/// One extension element, captured generically.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extension {
    /// Local element name.
    pub name: String,
    /// Concatenated text content.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Attributes as written.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Child elements, keyed by local name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Vec<Extension>>,
}

/// Capability boundary for namespaced extension content.
///
/// Supplied to each dialect parser at construction. `recognizes` is
/// consulted with the element's namespace prefix before any delegation;
/// `parse` receives the cursor positioned on the extension's start tag and
/// must consume the element through its end tag. Any error aborts the
/// surrounding parse — there is no partial-extension-tolerant mode.
pub trait ExtensionHandler: Send + Sync {
    fn recognizes(&self, namespace: Option<&str>) -> bool;

    fn parse(
        &self,
        cursor: &mut XmlCursor<'_>,
        acc: Extensions,
    ) -> Result<Extensions, ParseError>;
}

/// Prefixes that belong to the base dialects (or XML itself) and therefore
/// never mark extension content.
const RESERVED_PREFIXES: &[&str] = &["xml", "xmlns", "rss", "rdf", "atom", "content"];

/// Default handler: captures any prefixed element generically, preserving
/// its name, attributes, text and children in the [`Extensions`] map.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtensionParser;

impl ExtensionHandler for DefaultExtensionParser {
    fn recognizes(&self, namespace: Option<&str>) -> bool {
        match namespace {
            Some(prefix) => !RESERVED_PREFIXES.contains(&prefix),
            None => false,
        }
    }

    fn parse(
        &self,
        cursor: &mut XmlCursor<'_>,
        mut acc: Extensions,
    ) -> Result<Extensions, ParseError> {
        let (prefix, local) = {
            let element = cursor.element().ok_or_else(|| {
                ParseError::Extension("handler invoked outside a start tag".to_string())
            })?;
            (
                element.prefix.clone().unwrap_or_default(),
                element.local.clone(),
            )
        };

        let parsed = parse_element(cursor)?;

        acc.entry(prefix)
            .or_default()
            .entry(local)
            .or_default()
            .push(parsed);
        Ok(acc)
    }
}

/// Recursively captures the current element through its end tag.
fn parse_element(cursor: &mut XmlCursor<'_>) -> Result<Extension, ParseError> {
    let element = cursor
        .element()
        .ok_or_else(|| ParseError::Extension("expected a start tag".to_string()))?;

    let mut ext = Extension {
        name: element.local.clone(),
        ..Extension::default()
    };
    for (key, value) in element.attrs() {
        ext.attrs.insert(key.to_string(), value.to_string());
    }

    loop {
        match cursor.next_node()? {
            Node::Text(text) => ext.value.push_str(&text),
            Node::Start => {
                let child = parse_element(cursor)?;
                ext.children.entry(child.name.clone()).or_default().push(child);
            }
            Node::End => return Ok(ext),
            Node::Eof => return Err(ParseError::UnexpectedEof),
        }
    }
}
