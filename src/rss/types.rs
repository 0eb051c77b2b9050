use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extension::Extensions;

/// A parsed RSS (or RDF) document, before translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Channel-level publication date, raw.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pub_date: String,
    pub version: String,
}

/// One `<item>` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pub_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

/// An image attached to an item, from an `<enclosure>` with an image type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
}
