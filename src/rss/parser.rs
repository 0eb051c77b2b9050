use std::io::BufRead;
use std::sync::Arc;

use crate::error::ParseError;
use crate::extension::{DefaultExtensionParser, ExtensionHandler, Extensions};
use crate::model::VERSION_UNKNOWN;
use crate::rss::types::{Feed, Image, Item};
use crate::xml::{parse_date, Token, XmlCursor};

/// Streaming RSS extractor.
///
/// Accepts both RSS 0.9x/2.0 (`<rss>` root with a `<channel>`) and RDF-based
/// RSS 1.0 (`<rdf:RDF>` root, where `<item>` elements sit beside the
/// channel). Same contract as the sitemap extractor: one forward pass,
/// recognized extension namespaces delegated to the injected handler,
/// everything else outside the grammar skipped whole.
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

    /// Parses one RSS document from `source`.
    pub fn parse<R: BufRead>(&self, source: R) -> Result<Feed, ParseError> {
        let mut source = source;
        let mut cursor = XmlCursor::new(&mut source);
        cursor
            .advance_to_root()?
            .ok_or(ParseError::UnexpectedEof)?;
        self.parse_root(&mut cursor)
    }

    fn parse_root(&self, cursor: &mut XmlCursor<'_>) -> Result<Feed, ParseError> {
        let root = cursor.current_start()?;

        let root_name = root.local.clone();
        let version = match root_name.as_str() {
            // RDF carries no version attribute; it is RSS 1.0 by definition
            "rdf" => "1.0".to_string(),
            "rss" => root
                .attr("version")
                .filter(|v| !v.is_empty())
                .unwrap_or(VERSION_UNKNOWN)
                .to_string(),
            _ => {
                return Err(ParseError::UnexpectedElement {
                    expected: "rss|rdf".to_string(),
                    found: root_name,
                })
            }
        };

        let mut feed = Feed {
            version,
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
                    } else if local == "channel" {
                        self.parse_channel(cursor, &mut feed)?;
                    } else if local == "item" {
                        // RSS 1.0 places items directly under the root
                        let item = self.parse_item(cursor)?;
                        feed.items.push(item);
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        cursor.expect_end(&root_name)?;
        Ok(feed)
    }

    fn parse_channel(
        &self,
        cursor: &mut XmlCursor<'_>,
        feed: &mut Feed,
    ) -> Result<(), ParseError> {
        cursor.expect_start("channel")?;

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
                    } else if local == "language" {
                        feed.language = Some(cursor.read_text()?);
                    } else if local == "pubdate" {
                        feed.pub_date = cursor.read_text()?;
                    } else if local == "item" {
                        let item = self.parse_item(cursor)?;
                        feed.items.push(item);
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        cursor.expect_end("channel")?;
        Ok(())
    }

    fn parse_item(&self, cursor: &mut XmlCursor<'_>) -> Result<Item, ParseError> {
        cursor.expect_start("item")?;

        let mut item = Item::default();
        let mut extensions = Extensions::new();

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
                        item.title = cursor.read_text()?;
                    } else if local == "link" {
                        let link = cursor.read_text()?;
                        // First non-empty value wins; duplicates are consumed
                        // and dropped
                        if item.link.is_empty() {
                            item.link = link;
                        }
                    } else if local == "pubdate" {
                        let raw = cursor.read_text()?;
                        item.pub_date_parsed = parse_date(&raw);
                        item.pub_date = raw;
                    } else if local == "enclosure" {
                        let image = {
                            let element = cursor.current_start()?;
                            enclosure_image(
                                element.attr("url"),
                                element.attr("type"),
                            )
                        };
                        if item.image.is_none() {
                            if let Some(image) = image {
                                item.image = Some(image);
                            }
                        }
                        cursor.skip()?;
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        if !extensions.is_empty() {
            item.extensions = Some(extensions);
        }

        cursor.expect_end("item")?;
        Ok(item)
    }
}

/// An enclosure becomes the item image when it declares an image media type
/// (or none at all).
fn enclosure_image(url: Option<&str>, media_type: Option<&str>) -> Option<Image> {
    let url = url?;
    if url.is_empty() {
        return None;
    }
    match media_type {
        Some(t) if !t.starts_with("image/") => None,
        _ => Some(Image {
            link: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Feed {
        Parser::default().parse(doc.as_bytes()).unwrap()
    }

    #[test]
    fn test_channel_fields_and_items_in_order() {
        let feed = parse(
            r#"<rss version="2.0">
                 <channel>
                   <title>Example</title>
                   <language>en-us</language>
                   <pubDate>Tue, 02 Jan 2024 00:00:00 +0000</pubDate>
                   <item><title>one</title><link>http://a/1</link></item>
                   <item><title>two</title><link>http://a/2</link></item>
                 </channel>
               </rss>"#,
        );

        assert_eq!(feed.title.as_deref(), Some("Example"));
        assert_eq!(feed.language.as_deref(), Some("en-us"));
        assert_eq!(feed.version, "2.0");
        assert_eq!(feed.pub_date, "Tue, 02 Jan 2024 00:00:00 +0000");

        let titles: Vec<_> = feed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["one", "two"]);
    }

    #[test]
    fn test_version_fallback() {
        assert_eq!(parse("<rss><channel></channel></rss>").version, "unknown");
    }

    #[test]
    fn test_rdf_items_under_root() {
        let feed = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
                 <channel><title>R1</title></channel>
                 <item><title>a</title><link>http://a/1</link></item>
               </rdf:RDF>"#,
        );

        assert_eq!(feed.version, "1.0");
        assert_eq!(feed.title.as_deref(), Some("R1"));
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].link, "http://a/1");
    }

    #[test]
    fn test_duplicate_link_first_wins() {
        let feed = parse(
            r#"<rss version="2.0"><channel>
                 <item><link>http://a/1</link><link>http://a/2</link></item>
               </channel></rss>"#,
        );
        assert_eq!(feed.items[0].link, "http://a/1");
    }

    #[test]
    fn test_item_pub_date_parsed() {
        let feed = parse(
            r#"<rss version="2.0"><channel>
                 <item><pubDate>Tue, 02 Jan 2024 00:00:00 +0000</pubDate></item>
               </channel></rss>"#,
        );
        assert!(feed.items[0].pub_date_parsed.is_some());
    }

    #[test]
    fn test_image_enclosure() {
        let feed = parse(
            r#"<rss version="2.0"><channel>
                 <item><enclosure url="http://a/i.jpg" type="image/jpeg"/></item>
                 <item><enclosure url="http://a/e.mp3" type="audio/mpeg"/></item>
               </channel></rss>"#,
        );

        assert_eq!(feed.items[0].image.as_ref().unwrap().link, "http://a/i.jpg");
        assert!(feed.items[1].image.is_none());
    }

    #[test]
    fn test_dc_extension_captured() {
        let feed = parse(
            r#"<rss version="2.0"><channel>
                 <item><dc:creator>jane</dc:creator><title>x</title></item>
               </channel></rss>"#,
        );

        let ext = feed.items[0].extensions.as_ref().unwrap();
        assert_eq!(ext["dc"]["creator"][0].value, "jane");
        assert_eq!(feed.items[0].title, "x");
    }
}
