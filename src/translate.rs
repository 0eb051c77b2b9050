//! Normalization of dialect trees into the canonical model.
//!
//! Translators are the seam where normalization policy lives: swapping one
//! out changes field fallbacks or sanitization without touching extraction.
//! They are pure — no I/O, and the input tree is never mutated.

use crate::error::ParseError;
use crate::model::{Feed, Image, Item};
use crate::{atom, rss, sitemap};

/// Maps a dialect-specific tree onto the canonical [`Feed`].
pub trait Translator<S>: Send + Sync {
    fn translate(&self, source: &S) -> Result<Feed, ParseError>;
}

/// Field-for-field translation of a sitemap tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSitemapTranslator;

impl Translator<sitemap::Feed> for DefaultSitemapTranslator {
    fn translate(&self, source: &sitemap::Feed) -> Result<Feed, ParseError> {
        Ok(Feed {
            title: source.title.clone(),
            language: source.language.clone(),
            version: source.version.clone(),
            items: source
                .items
                .iter()
                .map(|item| Item {
                    title: item.title.clone(),
                    link: item.link.clone(),
                    image: item.image.as_ref().map(|image| Image {
                        link: image.link.clone(),
                    }),
                    pub_date: item.pub_date.clone(),
                    pub_date_parsed: item.pub_date_parsed,
                    extensions: item.extensions.clone(),
                })
                .collect(),
        })
    }
}

/// Field-for-field translation of an RSS tree. The channel-level publication
/// date has no canonical counterpart and is dropped here.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRssTranslator;

impl Translator<rss::Feed> for DefaultRssTranslator {
    fn translate(&self, source: &rss::Feed) -> Result<Feed, ParseError> {
        Ok(Feed {
            title: source.title.clone(),
            language: source.language.clone(),
            version: source.version.clone(),
            items: source
                .items
                .iter()
                .map(|item| Item {
                    title: item.title.clone(),
                    link: item.link.clone(),
                    image: item.image.as_ref().map(|image| Image {
                        link: image.link.clone(),
                    }),
                    pub_date: item.pub_date.clone(),
                    pub_date_parsed: item.pub_date_parsed,
                    extensions: item.extensions.clone(),
                })
                .collect(),
        })
    }
}

/// Translation of an Atom tree; entries become items, and Atom's lack of an
/// entry image maps to `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAtomTranslator;

impl Translator<atom::Feed> for DefaultAtomTranslator {
    fn translate(&self, source: &atom::Feed) -> Result<Feed, ParseError> {
        Ok(Feed {
            title: source.title.clone(),
            language: source.language.clone(),
            version: source.version.clone(),
            items: source
                .entries
                .iter()
                .map(|entry| Item {
                    title: entry.title.clone(),
                    link: entry.link.clone(),
                    image: None,
                    pub_date: entry.pub_date.clone(),
                    pub_date_parsed: entry.pub_date_parsed,
                    extensions: entry.extensions.clone(),
                })
                .collect(),
        })
    }
}
