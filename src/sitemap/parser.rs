use std::io::BufRead;
use std::sync::Arc;

use crate::error::ParseError;
use crate::extension::{DefaultExtensionParser, ExtensionHandler, Extensions};
use crate::model::VERSION_UNKNOWN;
use crate::sitemap::types::{Feed, FeedHints, Image, Item, News};
use crate::xml::{parse_date, Token, XmlCursor};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// Byte-for-byte legacy fallbacks; downstream consumers match on these strings.
const FEED_TITLE_FALLBACK: &str = "unkonow";
const FEED_LANGUAGE_FALLBACK: &str = "unknow";

/// Streaming sitemap extractor.
///
/// Walks `<urlset>` in one forward pass, building a [`Feed`] of `<url>`
/// items in document order. Elements from recognized extension namespaces
/// are delegated to the injected [`ExtensionHandler`]; everything else
/// outside the sitemap grammar is skipped as a whole subtree.
///
/// The parser holds no per-document state, so one instance can parse any
/// number of documents sequentially.
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

    /// Parses one sitemap document from `source`.
    pub fn parse<R: BufRead>(&self, source: R) -> Result<Feed, ParseError> {
        let mut source = source;
        let mut cursor = XmlCursor::new(&mut source);
        cursor
            .advance_to_root()?
            .ok_or(ParseError::UnexpectedEof)?;
        self.parse_root(&mut cursor)
    }

    fn parse_root(&self, cursor: &mut XmlCursor<'_>) -> Result<Feed, ParseError> {
        let root = cursor.expect_start("urlset")?;

        let version = if root.attr("xmlns") == Some(SITEMAP_NS) {
            "0.9".to_string()
        } else {
            VERSION_UNKNOWN.to_string()
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
                        // The urlset level has nowhere to store extension
                        // content; the capability still consumes the element.
                        self.extensions.parse(cursor, Extensions::new())?;
                    } else if local == "url" {
                        let (item, hints) = self.parse_item(cursor)?;
                        feed.items.push(item);
                        adopt_hints(&mut feed, hints);
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        cursor.expect_end("urlset")?;
        Ok(feed)
    }

    /// Parses one `<url>` entry.
    ///
    /// The second return value carries feed-level title/language bubbled up
    /// from a nested `<news>` element; it is `None` when the item had none.
    fn parse_item(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> Result<(Item, Option<FeedHints>), ParseError> {
        cursor.expect_start("url")?;

        let mut item = Item::default();
        let mut hints = None;
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
                    } else if local == "news" {
                        let news = self.parse_news(cursor)?;
                        item.title = news.title;
                        item.pub_date_parsed = parse_date(&news.publication_date);
                        item.pub_date = news.publication_date;
                        hints = Some(FeedHints {
                            title: news.name,
                            language: news.language,
                        });
                    } else if local == "loc" {
                        let link = cursor.read_text()?;
                        // First non-empty value wins; duplicates are consumed
                        // and dropped
                        if item.link.is_empty() {
                            item.link = link;
                        }
                    } else if local == "image" {
                        item.image = Some(self.parse_image(cursor)?);
                    } else {
                        cursor.skip()?;
                    }
                }
            }
        }

        if !extensions.is_empty() {
            item.extensions = Some(extensions);
        }

        cursor.expect_end("url")?;
        Ok((item, hints))
    }

    fn parse_news(&self, cursor: &mut XmlCursor<'_>) -> Result<News, ParseError> {
        cursor.expect_start("news")?;

        let mut news = News::default();
        loop {
            match cursor.next_tag()? {
                Token::End => break,
                Token::Start => {
                    let local = cursor.current_start()?.local.clone();
                    match local.as_str() {
                        "publication" => {
                            let (name, language) = self.parse_publication(cursor)?;
                            news.name = name;
                            news.language = language;
                        }
                        "publication_date" => news.publication_date = cursor.read_text()?,
                        "title" => news.title = cursor.read_text()?,
                        _ => cursor.skip()?,
                    }
                }
            }
        }

        cursor.expect_end("news")?;
        Ok(news)
    }

    fn parse_publication(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> Result<(String, String), ParseError> {
        cursor.expect_start("publication")?;

        let mut name = String::new();
        let mut language = String::new();
        loop {
            match cursor.next_tag()? {
                Token::End => break,
                Token::Start => {
                    let local = cursor.current_start()?.local.clone();
                    match local.as_str() {
                        "name" => name = cursor.read_text()?,
                        "language" => language = cursor.read_text()?,
                        _ => cursor.skip()?,
                    }
                }
            }
        }

        cursor.expect_end("publication")?;
        Ok((name, language))
    }

    fn parse_image(&self, cursor: &mut XmlCursor<'_>) -> Result<Image, ParseError> {
        cursor.expect_start("image")?;

        let mut image = Image::default();
        loop {
            match cursor.next_tag()? {
                Token::End => break,
                Token::Start => {
                    let local = cursor.current_start()?.local.clone();
                    match local.as_str() {
                        "loc" => image.link = cursor.read_text()?,
                        _ => cursor.skip()?,
                    }
                }
            }
        }

        cursor.expect_end("image")?;
        Ok(image)
    }
}

/// Feed-level adoption of bubbled `<news>` values.
///
/// Each field is adopted only while still unset, from the first item that
/// supplied a hints record; empty bubbled values fall back to the legacy
/// literals.
fn adopt_hints(feed: &mut Feed, hints: Option<FeedHints>) {
    let Some(hints) = hints else { return };

    if feed.title.is_none() {
        feed.title = Some(if hints.title.is_empty() {
            FEED_TITLE_FALLBACK.to_string()
        } else {
            hints.title
        });
    }
    if feed.language.is_none() {
        feed.language = Some(if hints.language.is_empty() {
            FEED_LANGUAGE_FALLBACK.to_string()
        } else {
            hints.language
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Feed {
        Parser::default().parse(doc.as_bytes()).unwrap()
    }

    #[test]
    fn test_version_from_namespace() {
        let feed = parse(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></urlset>"#);
        assert_eq!(feed.version, "0.9");

        let feed = parse(r#"<urlset xmlns="http://elsewhere/"></urlset>"#);
        assert_eq!(feed.version, "unknown");

        let feed = parse("<urlset></urlset>");
        assert_eq!(feed.version, "unknown");
    }

    #[test]
    fn test_news_redistributes_into_item_and_feed() {
        let feed = parse(
            r#"<urlset>
                 <url>
                   <loc>http://a/1</loc>
                   <news>
                     <publication><name>The Daily</name><language>en</language></publication>
                     <publication_date>2024-01-02T00:00:00Z</publication_date>
                     <title>Headline</title>
                   </news>
                 </url>
               </urlset>"#,
        );

        assert_eq!(feed.title.as_deref(), Some("The Daily"));
        assert_eq!(feed.language.as_deref(), Some("en"));

        let item = &feed.items[0];
        assert_eq!(item.title, "Headline");
        assert_eq!(item.pub_date, "2024-01-02T00:00:00Z");
        assert!(item.pub_date_parsed.is_some());
    }

    #[test]
    fn test_news_with_empty_publication_uses_legacy_fallbacks() {
        let feed = parse(
            r#"<urlset>
                 <url><loc>http://a/1</loc><news><title>t</title></news></url>
               </urlset>"#,
        );

        assert_eq!(feed.title.as_deref(), Some("unkonow"));
        assert_eq!(feed.language.as_deref(), Some("unknow"));
    }

    #[test]
    fn test_item_without_news_leaves_feed_fields_unset() {
        let feed = parse("<urlset><url><loc>http://a/1</loc></url></urlset>");
        assert!(feed.title.is_none());
        assert!(feed.language.is_none());
    }

    #[test]
    fn test_unparseable_publication_date_is_non_fatal() {
        let feed = parse(
            r#"<urlset>
                 <url><news><publication_date>soonish</publication_date></news></url>
               </urlset>"#,
        );

        let item = &feed.items[0];
        assert_eq!(item.pub_date, "soonish");
        assert!(item.pub_date_parsed.is_none());
    }

    #[test]
    fn test_image_nested_loc() {
        let feed = parse(
            r#"<urlset>
                 <url>
                   <loc>http://a/1</loc>
                   <image><loc>http://a/cover.jpg</loc><caption>x</caption></image>
                 </url>
               </urlset>"#,
        );

        let image = feed.items[0].image.as_ref().unwrap();
        assert_eq!(image.link, "http://a/cover.jpg");
        assert_eq!(feed.items[0].link, "http://a/1");
    }

    #[test]
    fn test_mismatched_root_is_fatal() {
        let err = Parser::default().parse(&b"<rss></rss>"[..]).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedElement { .. }));
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let err = Parser::default()
            .parse(&b"<urlset><url><loc>http://a/"[..])
            .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof | ParseError::Xml(_)));
    }
}
