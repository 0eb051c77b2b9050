//! Universal feed parser: RSS, Atom, and Sitemap into one canonical model.
//!
//! Syndication sources come in structurally different XML dialects; crawlers
//! shouldn't care. This crate detects a document's dialect from its root
//! element, runs a streaming dialect-specific extractor over it, and
//! normalizes the result into a single [`Feed`]/[`Item`] shape.
//!
//! # Architecture
//!
//! - [`detect`] - Feed-type detection from the root element, never failing
//! - [`sitemap`], [`rss`], [`atom`] - One streaming extractor per dialect,
//!   each producing its own intermediate tree
//! - [`translate`] - Pure per-dialect translators into the canonical model
//! - [`parser`] - The orchestrator composing detect → extract → translate,
//!   with capture-and-replay so detection costs no bytes
//! - [`fetch`] - Async HTTP retrieval (timeouts, optional authenticated
//!   proxy) around the synchronous core
//! - [`extension`] - The pluggable capability for namespaced extension
//!   content
//!
//! # Example
//!
//! ```
//! use unifeed::FeedParser;
//!
//! let parser = FeedParser::new();
//! let feed = parser.parse_str(
//!     r#"<rss version="2.0"><channel>
//!          <title>Example</title>
//!          <item><title>hello</title><link>http://example.com/1</link></item>
//!        </channel></rss>"#,
//! ).unwrap();
//!
//! assert_eq!(feed.title.as_deref(), Some("Example"));
//! assert_eq!(feed.items[0].link, "http://example.com/1");
//! ```

pub mod atom;
pub mod detect;
pub mod error;
pub mod extension;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod rss;
pub mod sitemap;
pub mod translate;
pub mod xml;

pub use detect::{detect_feed_type, FeedType};
pub use error::ParseError;
pub use extension::{DefaultExtensionParser, Extension, ExtensionHandler, Extensions};
pub use fetch::{FetchError, Fetcher, ProxyConfig};
pub use model::{Feed, Image, Item, VERSION_UNKNOWN};
pub use parser::FeedParser;
pub use translate::{
    DefaultAtomTranslator, DefaultRssTranslator, DefaultSitemapTranslator, Translator,
};
