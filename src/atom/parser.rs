use std::io::BufRead;
use std::sync::Arc;

use crate::atom::types::{Entry, Feed};
use crate::error::ParseError;
use crate::extension::{DefaultExtensionParser, ExtensionHandler, Extensions};
use crate::model::VERSION_UNKNOWN;
use crate::xml::{parse_date, Token, XmlCursor};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Streaming Atom extractor.
///
/// Same contract as the sitemap extractor: one forward pass over `<feed>`,
/// entries collected in document order, extension namespaces delegated,
/// unknown elements skipped whole.
pub struct Parser {
    extensions: Arc<dyn ExtensionHandler>,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(Arc::new(DefaultExtensionParser))
    }
}

impl Parser {
    pub fn new(extensions: Arc<dyn ExtensionHandler>) -> Self {
        Parser { extensions }
    }

    /// Parses one Atom document from `source`.
    pub fn parse<R: BufRead>(&self, source: R) -> Result<Feed, ParseError> {
        let mut source = source;
        let mut cursor = XmlCursor::new(&mut source);
        cursor
            .advance_to_root()?
            .ok_or(ParseError::UnexpectedEof)?;
        self.parse_root(&mut cursor)
    }

    fn parse_root(&self, cursor: &mut XmlCursor<'_>) -> Result<Feed, ParseError> {
        let root = cursor.expect_start("feed")?;

        let version = if root.attr("xmlns") == Some(ATOM_NS) {
            "1.0".to_string()
        } else {
            // Atom 0.3 carried an explicit version attribute
            root.attr("version")
                .filter(|v| !v.is_empty())
                .unwrap_or(VERSION_UNKNOWN)
                .to_string()
        };
        let language = root.attr("xml:lang").map(str::to_string);

        let mut feed = Feed {
            version,
            language,
            ..Feed::default()
        };

        loop {
            match cursor.next_tag()? {
                Token::End => break,
                Token::Start => {
                    let (local, prefix) = {
                        let element = cursor.current_start()?;
                        (element.local.clone(), element.prefix.clone())
                    };

                    if self.extensions.recognizes(prefix.as_deref()) {
                        self.extensions.parse(cursor, Extensions::new())?;
                    } else if local == "title" {
                        feed.title = Some(cursor.read_text()?);
                    } else if local == "entry" {
                        let entry = self.parse_entry(cursor)?;
                        feed.entries.push(entry);
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        cursor.expect_end("feed")?;
        Ok(feed)
    }

    fn parse_entry(&self, cursor: &mut XmlCursor<'_>) -> Result<Entry, ParseError> {
        cursor.expect_start("entry")?;

        let mut entry = Entry::default();
        let mut extensions = Extensions::new();
        let mut published = String::new();
        let mut updated = String::new();

        loop {
            match cursor.next_tag()? {
                Token::End => break,
                Token::Start => {
                    let (local, prefix) = {
                        let element = cursor.current_start()?;
                        (element.local.clone(), element.prefix.clone())
                    };

                    if self.extensions.recognizes(prefix.as_deref()) {
                        extensions = self.extensions.parse(cursor, extensions)?;
                    } else if local == "title" {
                        entry.title = cursor.read_text()?;
                    } else if local == "link" {
                        let href = {
                            let element = cursor.current_start()?;
                            alternate_href(element.attr("rel"), element.attr("href"))
                        };
                        // First non-empty alternate link wins
                        if entry.link.is_empty() {
                            if let Some(href) = href {
                                entry.link = href;
                            }
                        }
                        cursor.skip()?;
                    } else if local == "published" {
                        published = cursor.read_text()?;
                    } else if local == "updated" {
                        updated = cursor.read_text()?;
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        let raw_date = if published.is_empty() { updated } else { published };
        entry.pub_date_parsed = parse_date(&raw_date);
        entry.pub_date = raw_date;

        if !extensions.is_empty() {
            entry.extensions = Some(extensions);
        }

        cursor.expect_end("entry")?;
        Ok(entry)
    }
}

/// A `<link>` counts as the entry link when its `rel` is `alternate` or absent.
fn alternate_href(rel: Option<&str>, href: Option<&str>) -> Option<String> {
    match rel {
        Some("alternate") | None => href.filter(|h| !h.is_empty()).map(str::to_string),
        Some(_) => None,
    }
}
