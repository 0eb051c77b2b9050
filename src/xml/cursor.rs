use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::error::ParseError;

/// A significant token the cursor can be positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Start,
    End,
}

/// One node-level event, including character data.
///
/// Dialect parsers walk tags only ([`XmlCursor::next_tag`]); extension
/// handlers that capture element bodies verbatim use [`XmlCursor::next_node`]
/// to see text as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Start,
    End,
    Text(String),
    Eof,
}

/// A start element captured by the cursor, with its attributes decoded.
#[derive(Debug, Clone)]
pub struct Element {
    /// Qualified name exactly as written in the document (e.g. `news:news`).
    pub name: String,
    /// Lower-cased local name (e.g. `news`). Dialect grammars dispatch on this.
    pub local: String,
    /// Namespace prefix, if the name was prefixed.
    pub prefix: Option<String>,
    attrs: Vec<(String, String)>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>, decoder: quick_xml::encoding::Decoder) -> Result<Self, ParseError> {
        let qname = start.name();
        let name = String::from_utf8_lossy(qname.as_ref()).into_owned();
        let local = String::from_utf8_lossy(qname.local_name().as_ref()).to_lowercase();
        let prefix = qname
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.decode_and_unescape_value(decoder)?.into_owned();
            attrs.push((key, value));
        }

        Ok(Element {
            name,
            local,
            prefix,
            attrs,
        })
    }

    /// Looks up an attribute by its name as written (e.g. `xmlns`, `href`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug)]
enum State {
    /// No significant token read yet.
    Fresh,
    /// Positioned on a start tag.
    Start(Element),
    /// Positioned on an end tag (lower-cased local name).
    End(String),
}

/// Forward-only pull cursor over an XML byte stream.
///
/// Wraps a `quick_xml::Reader` and exposes the small set of operations the
/// dialect state machines are written against: advance to the next tag,
/// assert the current tag, skip a whole subtree unread, and read an
/// element's text content. The cursor is single-pass and holds no state
/// across documents; one cursor serves exactly one parse.
pub struct XmlCursor<'r> {
    reader: Reader<&'r mut (dyn BufRead + 'r)>,
    buf: Vec<u8>,
    state: State,
}

impl<'r> XmlCursor<'r> {
    pub fn new(source: &'r mut (dyn BufRead + 'r)) -> Self {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(true);
        // Self-closing tags surface as Start+End so the grammars see one shape
        config.expand_empty_elements = true;

        XmlCursor {
            reader,
            buf: Vec::new(),
            state: State::Fresh,
        }
    }

    /// The start element the cursor is currently positioned on, if any.
    pub fn element(&self) -> Option<&Element> {
        match &self.state {
            State::Start(el) => Some(el),
            _ => None,
        }
    }

    /// Like [`XmlCursor::element`], but a missing start tag is a structural error.
    pub fn current_start(&self) -> Result<&Element, ParseError> {
        self.element()
            .ok_or_else(|| ParseError::Xml("cursor is not positioned on a start tag".to_string()))
    }

    /// Advances past the prolog (declaration, comments, doctype, whitespace)
    /// to the document's root start element.
    ///
    /// Returns `Ok(None)` on a document with no elements at all; the
    /// type detector maps that to `Unknown` while dialect parsers treat it
    /// as a truncated document.
    pub fn advance_to_root(&mut self) -> Result<Option<&Element>, ParseError> {
        loop {
            match self.next_node()? {
                Node::Start => {
                    return Ok(self.element());
                }
                Node::End => {
                    return Err(ParseError::Xml("end tag before document root".to_string()));
                }
                Node::Text(_) => continue,
                Node::Eof => return Ok(None),
            }
        }
    }

    /// Next node-level event: start tag, end tag, or non-empty text run.
    pub fn next_node(&mut self) -> Result<Node, ParseError> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    let element = Element::from_start(&start, self.reader.decoder())?;
                    self.state = State::Start(element);
                    return Ok(Node::Start);
                }
                Event::End(end) => {
                    let name = lower_local(end.name());
                    self.state = State::End(name);
                    return Ok(Node::End);
                }
                Event::Text(text) => {
                    let text = text.unescape()?.into_owned();
                    if !text.is_empty() {
                        return Ok(Node::Text(text));
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    if !text.is_empty() {
                        return Ok(Node::Text(text));
                    }
                }
                Event::Eof => return Ok(Node::Eof),
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }
    }

    /// Next significant tag, skipping character data.
    ///
    /// Running out of input mid-element is a structural error: every caller
    /// of `next_tag` is inside an open element waiting for its end tag.
    pub fn next_tag(&mut self) -> Result<Token, ParseError> {
        loop {
            match self.next_node()? {
                Node::Start => return Ok(Token::Start),
                Node::End => return Ok(Token::End),
                Node::Text(_) => continue,
                Node::Eof => return Err(ParseError::UnexpectedEof),
            }
        }
    }

    /// Asserts the cursor is on a start tag with the given local name.
    pub fn expect_start(&self, tag: &str) -> Result<&Element, ParseError> {
        match &self.state {
            State::Start(el) if el.local == tag => Ok(el),
            other => Err(ParseError::UnexpectedElement {
                expected: tag.to_string(),
                found: describe(other),
            }),
        }
    }

    /// Asserts the cursor is on the end tag with the given local name.
    pub fn expect_end(&self, tag: &str) -> Result<(), ParseError> {
        match &self.state {
            State::End(name) if name == tag => Ok(()),
            other => Err(ParseError::UnexpectedElement {
                expected: format!("/{}", tag),
                found: describe(other),
            }),
        }
    }

    /// Consumes the entire subtree of the current start element, leaving the
    /// cursor on its end tag. The content is never inspected.
    pub fn skip(&mut self) -> Result<(), ParseError> {
        if !matches!(self.state, State::Start(_)) {
            return Err(ParseError::Xml("skip called outside a start tag".to_string()));
        }

        let mut depth = 0usize;
        loop {
            match self.next_node()? {
                Node::Start => depth += 1,
                Node::End => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                Node::Text(_) => {}
                Node::Eof => return Err(ParseError::UnexpectedEof),
            }
        }
    }

    /// Reads the text content of the current start element, consuming it
    /// through its end tag. Nested markup is skipped, not flattened.
    pub fn read_text(&mut self) -> Result<String, ParseError> {
        if !matches!(self.state, State::Start(_)) {
            return Err(ParseError::Xml(
                "read_text called outside a start tag".to_string(),
            ));
        }

        let mut text = String::new();
        loop {
            match self.next_node()? {
                Node::Text(chunk) => text.push_str(&chunk),
                Node::Start => self.skip()?,
                Node::End => return Ok(text),
                Node::Eof => return Err(ParseError::UnexpectedEof),
            }
        }
    }
}

fn lower_local(qname: QName<'_>) -> String {
    String::from_utf8_lossy(qname.local_name().as_ref()).to_lowercase()
}

fn describe(state: &State) -> String {
    match state {
        State::Fresh => "(document start)".to_string(),
        State::Start(el) => el.local.clone(),
        State::End(name) => format!("/{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_over<'a>(source: &'a mut &'a [u8]) -> XmlCursor<'a> {
        XmlCursor::new(source)
    }

    #[test]
    fn test_advance_to_root_skips_prolog() {
        let mut doc: &[u8] = b"<?xml version=\"1.0\"?>\n<!-- hi -->\n<urlset xmlns=\"ns\"/>";
        let mut cursor = cursor_over(&mut doc);

        let root = cursor.advance_to_root().unwrap().expect("root element");
        assert_eq!(root.local, "urlset");
        assert_eq!(root.attr("xmlns"), Some("ns"));
    }

    #[test]
    fn test_advance_to_root_empty_document() {
        let mut doc: &[u8] = b"   ";
        let mut cursor = cursor_over(&mut doc);
        assert!(cursor.advance_to_root().unwrap().is_none());
    }

    #[test]
    fn test_read_text_unescapes_and_skips_markup() {
        let mut doc: &[u8] = b"<a>one &amp; <b><c>nested</c></b>two</a>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();

        let text = cursor.read_text().unwrap();
        assert_eq!(text, "one &two");
    }

    #[test]
    fn test_read_text_cdata() {
        let mut doc: &[u8] = b"<a><![CDATA[<kept as-is>]]></a>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();
        assert_eq!(cursor.read_text().unwrap(), "<kept as-is>");
    }

    #[test]
    fn test_skip_consumes_whole_subtree() {
        let mut doc: &[u8] = b"<a><junk><deep><deeper/></deep></junk><keep>x</keep></a>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();

        assert_eq!(cursor.next_tag().unwrap(), Token::Start);
        cursor.skip().unwrap();

        assert_eq!(cursor.next_tag().unwrap(), Token::Start);
        let el = cursor.element().unwrap();
        assert_eq!(el.local, "keep");
        assert_eq!(cursor.read_text().unwrap(), "x");
    }

    #[test]
    fn test_expanded_empty_element() {
        let mut doc: &[u8] = b"<a><b/></a>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();

        assert_eq!(cursor.next_tag().unwrap(), Token::Start);
        cursor.expect_start("b").unwrap();
        assert_eq!(cursor.next_tag().unwrap(), Token::End);
        cursor.expect_end("b").unwrap();
    }

    #[test]
    fn test_prefix_and_local_name() {
        let mut doc: &[u8] = b"<root><news:news/></root>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();
        cursor.next_tag().unwrap();

        let el = cursor.element().unwrap();
        assert_eq!(el.local, "news");
        assert_eq!(el.prefix.as_deref(), Some("news"));
        assert_eq!(el.name, "news:news");
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let mut doc: &[u8] = b"<a><b>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();
        cursor.next_tag().unwrap();

        let err = cursor.read_text().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof));
    }

    #[test]
    fn test_mismatched_expect_reports_both_names() {
        let mut doc: &[u8] = b"<rss/>";
        let mut cursor = cursor_over(&mut doc);
        cursor.advance_to_root().unwrap();

        let err = cursor.expect_start("urlset").unwrap_err();
        match err {
            ParseError::UnexpectedElement { expected, found } => {
                assert_eq!(expected, "urlset");
                assert_eq!(found, "rss");
            }
            other => panic!("expected UnexpectedElement, got {:?}", other),
        }
    }
}
