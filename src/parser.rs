//! The universal parser: detection, dispatch, translation.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

use crate::detect::{detect_feed_type, FeedType};
use crate::error::ParseError;
use crate::extension::{DefaultExtensionParser, ExtensionHandler};
use crate::model::Feed;
use crate::translate::{
    DefaultAtomTranslator, DefaultRssTranslator, DefaultSitemapTranslator, Translator,
};
use crate::{atom, rss, sitemap};

/// Captures every byte handed out, so a stream consumed during detection
/// can be replayed for extraction.
struct CaptureReader<R: Read> {
    inner: R,
    captured: Vec<u8>,
}

impl<R: Read> CaptureReader<R> {
    fn new(inner: R) -> Self {
        CaptureReader {
            inner,
            captured: Vec::new(),
        }
    }

    fn into_parts(self) -> (Vec<u8>, R) {
        (self.captured, self.inner)
    }
}

impl<R: Read> Read for CaptureReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.captured.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Universal feed parser.
///
/// Detects a document's dialect, runs the matching streaming extractor, and
/// normalizes the result through the matching translator. Detection consumes
/// bytes; those bytes are captured and spliced back in front of the stream,
/// so the extractor always sees the complete original document.
///
/// All collaborators — the three dialect parsers, their shared extension
/// handler, and the three translators — are fixed at construction.
/// A `FeedParser` holds no per-document state; reuse it freely for
/// sequential documents.
///
/// ```
/// use unifeed::FeedParser;
///
/// let parser = FeedParser::new();
/// let feed = parser
///     .parse_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///                     <url><loc>http://a/</loc></url>
///                   </urlset>"#)
///     .unwrap();
/// assert_eq!(feed.version, "0.9");
/// assert_eq!(feed.items[0].link, "http://a/");
/// ```
pub struct FeedParser {
    sitemap_parser: sitemap::Parser,
    rss_parser: rss::Parser,
    atom_parser: atom::Parser,
    sitemap_translator: Box<dyn Translator<sitemap::Feed>>,
    rss_translator: Box<dyn Translator<rss::Feed>>,
    atom_translator: Box<dyn Translator<atom::Feed>>,
}

impl Default for FeedParser {
    fn default() -> Self {
        FeedParser::new()
    }
}

impl FeedParser {
    /// A parser with the default translators and the generic extension
    /// handler.
    pub fn new() -> Self {
        FeedParser::with_extension_handler(Arc::new(DefaultExtensionParser))
    }

    /// A parser whose dialect extractors share the given extension handler.
    pub fn with_extension_handler(extensions: Arc<dyn ExtensionHandler>) -> Self {
        FeedParser {
            sitemap_parser: sitemap::Parser::new(Arc::clone(&extensions)),
            rss_parser: rss::Parser::new(Arc::clone(&extensions)),
            atom_parser: atom::Parser::new(extensions),
            sitemap_translator: Box::new(DefaultSitemapTranslator),
            rss_translator: Box::new(DefaultRssTranslator),
            atom_translator: Box::new(DefaultAtomTranslator),
        }
    }

    /// Replaces the sitemap translator.
    pub fn with_sitemap_translator(
        mut self,
        translator: Box<dyn Translator<sitemap::Feed>>,
    ) -> Self {
        self.sitemap_translator = translator;
        self
    }

    /// Replaces the RSS translator.
    pub fn with_rss_translator(mut self, translator: Box<dyn Translator<rss::Feed>>) -> Self {
        self.rss_translator = translator;
        self
    }

    /// Replaces the Atom translator.
    pub fn with_atom_translator(mut self, translator: Box<dyn Translator<atom::Feed>>) -> Self {
        self.atom_translator = translator;
        self
    }

    /// Parses one XML document into the canonical feed model.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnknownFeedType`] when the root element matches no
    /// dialect; otherwise whatever structural error the dialect extractor
    /// hit. Date parse failures never surface here.
    pub fn parse(&self, source: impl Read) -> Result<Feed, ParseError> {
        let mut capture = CaptureReader::new(source);
        let feed_type = detect_feed_type(BufReader::new(&mut capture));
        tracing::debug!(feed_type = ?feed_type, "detected feed type");

        // Splice the bytes detection consumed back in front of the rest
        let (captured, rest) = capture.into_parts();
        let replay = BufReader::new(io::Cursor::new(captured).chain(rest));

        self.parse_detected(replay, feed_type)
    }

    /// Parses a document already held in memory.
    pub fn parse_str(&self, source: &str) -> Result<Feed, ParseError> {
        self.parse(source.as_bytes())
    }

    fn parse_detected(
        &self,
        source: impl BufRead,
        feed_type: FeedType,
    ) -> Result<Feed, ParseError> {
        match feed_type {
            FeedType::Sitemap => {
                let tree = self.sitemap_parser.parse(source)?;
                self.sitemap_translator.translate(&tree)
            }
            FeedType::Rss => {
                let tree = self.rss_parser.parse(source)?;
                self.rss_translator.translate(&tree)
            }
            FeedType::Atom => {
                let tree = self.atom_parser.parse(source)?;
                self.atom_translator.translate(&tree)
            }
            FeedType::Unknown => Err(ParseError::UnknownFeedType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_reader_replays_every_byte() {
        let source: &[u8] = b"0123456789";
        let mut capture = CaptureReader::new(source);

        let mut first = [0u8; 4];
        capture.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"0123");

        let (captured, rest) = capture.into_parts();
        let mut replay = io::Cursor::new(captured).chain(rest);
        let mut all = Vec::new();
        replay.read_to_end(&mut all).unwrap();
        assert_eq!(all, b"0123456789");
    }

    #[test]
    fn test_unknown_feed_type_is_fatal() {
        let err = FeedParser::new().parse_str("<html></html>").unwrap_err();
        assert!(matches!(err, ParseError::UnknownFeedType));
    }
}
