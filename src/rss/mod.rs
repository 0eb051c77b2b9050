//! RSS dialect: streaming extraction of `<rss>` and `<rdf:RDF>` documents.

mod parser;
mod types;

pub use parser::Parser;
pub use types::{Feed, Image, Item};
