//! Element tree for XHTML content documents
//!
//! A small arena DOM that keeps only element nodes. Text, comments,
//! processing instructions, CDATA and doctype declarations are skipped while
//! parsing, so every node in the arena is an element and arena order is
//! document order.

mod node;
mod parse;

pub use node::{Descendants, Document, Element, NodeId};
pub use parse::MarkupError;
