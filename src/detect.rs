//! Feed-type detection from a document's root element.

use std::io::BufRead;

use crate::xml::XmlCursor;

/// The feed dialects this crate can detect and parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedType {
    Rss,
    Atom,
    Sitemap,
    Unknown,
}

/// Classifies a document by its root element.
///
/// Reads only as far as the root start tag — prolog, comments and leading
/// whitespace are skipped. Detection never fails: malformed, empty or
/// unrecognized input yields [`FeedType::Unknown`].
///
/// Detection consumes bytes from `source`. Callers that go on to parse the
/// same document must capture those bytes and splice them back in front of
/// the stream; [`crate::parser::FeedParser::parse`] does exactly that.
pub fn detect_feed_type(mut source: impl BufRead) -> FeedType {
    let mut cursor = XmlCursor::new(&mut source);

    let root = match cursor.advance_to_root() {
        Ok(Some(element)) => element,
        Ok(None) | Err(_) => return FeedType::Unknown,
    };

    match root.local.as_str() {
        "rdf" => FeedType::Rss,
        "rss" => FeedType::Rss,
        "feed" => FeedType::Atom,
        "urlset" => FeedType::Sitemap,
        _ => FeedType::Unknown,
    }
}
