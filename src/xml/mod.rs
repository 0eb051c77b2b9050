//! XML plumbing shared by every dialect parser.
//!
//! [`cursor`] wraps `quick-xml` in a forward-only pull cursor exposing the
//! handful of operations the dialect state machines are written against;
//! [`dates`] holds the best-effort timestamp parser.

mod cursor;
mod dates;

pub use cursor::{Element, Node, Token, XmlCursor};
pub use dates::parse_date;
