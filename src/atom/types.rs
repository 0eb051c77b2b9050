use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extension::Extensions;

/// A parsed Atom document, before translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub version: String,
}

/// One `<entry>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    /// `<published>` when present, `<updated>` otherwise; raw.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pub_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}
