use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extension::Extensions;

/// A parsed sitemap document, before translation to the canonical model.
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

/// One `<url>` entry.
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

/// An `<image>` block inside a `<url>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
}

/// Transient carrier for a `<news>` block.
///
/// Exists only while its fields are redistributed: title and publication
/// date land on the enclosing [`Item`], name and language bubble up to the
/// feed level as [`FeedHints`].
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct News {
    pub name: String,
    pub title: String,
    pub language: String,
    pub publication_date: String,
}

/// Feed-level values bubbled up from an item's `<news>` element.
///
/// Returned alongside the item itself so no parsing level mutates enclosing
/// state; produced only when a `<news>` element was actually present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedHints {
    pub title: String,
    pub language: String,
}
