//! Book content access
//!
//! The indexer only needs two things from a book: its spine (content units in
//! reading order) and the bytes of each unit. [`ContentSource`] is that
//! contract; [`EpubSource`] implements it over an EPUB archive using the rbook
//! crate and [`MemorySource`] over content already held in memory.

mod reader;
mod source;

pub use reader::EpubSource;
pub use source::{ContentError, ContentSource, MemorySource};
