//! Error types for position indexing
//!
//! Only failures that make a whole book unindexable surface as errors.
//! Bad or unknown addresses are not errors; the resolver reports them as
//! [`crate::resolver::Resolution::Unresolved`].

use std::time::Duration;

use thiserror::Error;

use crate::dom::MarkupError;
use crate::epub::ContentError;

/// Indexing result type
pub type Result<T> = std::result::Result<T, IndexError>;

/// A book could not be indexed; no partial index is ever produced
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Book {book_id}: content unavailable: {source}")]
    Content {
        book_id: String,
        #[source]
        source: ContentError,
    },

    #[error("Book {book_id}: fragment {fragment} ({unit}) is not well-formed: {source}")]
    Markup {
        book_id: String,
        fragment: u32,
        unit: String,
        #[source]
        source: MarkupError,
    },

    #[error("Book {book_id}: spine is empty")]
    EmptySpine { book_id: String },

    #[error("Book {book_id}: {limit} limit of {max} exceeded")]
    LimitExceeded {
        book_id: String,
        limit: &'static str,
        max: u64,
    },

    #[error("Book {book_id}: indexing did not finish within {timeout:?}")]
    DeadlineExceeded { book_id: String, timeout: Duration },

    #[error("Book {book_id}: indexing task failed: {message}")]
    Task { book_id: String, message: String },
}

impl IndexError {
    /// The book this error is about
    pub fn book_id(&self) -> &str {
        match self {
            IndexError::Content { book_id, .. }
            | IndexError::Markup { book_id, .. }
            | IndexError::EmptySpine { book_id }
            | IndexError::LimitExceeded { book_id, .. }
            | IndexError::DeadlineExceeded { book_id, .. }
            | IndexError::Task { book_id, .. } => book_id,
        }
    }
}
