use thiserror::Error;

/// Errors that can abort a feed parse.
///
/// Structural problems (tag mismatches, truncated documents) and tokenizer
/// failures are fatal: the parse stops and the error is propagated verbatim.
/// Date parsing is the only tolerated failure and never surfaces here — a
/// bad date simply leaves the typed field unset.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying XML tokenizer rejected the input.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The parser was positioned on a different element than the dialect
    /// grammar requires.
    #[error("unexpected element <{found}> (expected <{expected}>)")]
    UnexpectedElement { expected: String, found: String },

    /// The document ended in the middle of an element.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// Detection could not classify the document's root element.
    #[error("failed to detect feed type")]
    UnknownFeedType,

    /// A delegated extension handler failed; the whole parse aborts.
    #[error("extension parse error: {0}")]
    Extension(String),
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for ParseError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        ParseError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::Xml(err.to_string())
    }
}
