//! The canonical, dialect-neutral feed model.
//!
//! Every dialect tree is translated into these types, so downstream code
//! crawls RSS, Atom and Sitemap sources through one shape. Serialized form
//! omits empty fields; `version` is always present.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extension::Extensions;

/// Version sentinel used when a document carries no recognizable version.
pub const VERSION_UNKNOWN: &str = "unknown";

/// A normalized feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub version: String,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

/// One entry of a normalized feed, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Target URL. Semantically required but tolerated empty; set at most
    /// once per item (first non-empty source value wins).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// Publication date exactly as it appeared in the document.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pub_date: String,
    /// UTC-normalized publication date; absent when the raw value did not parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    /// Present iff at least one extension element was encountered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

/// An image attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
}
