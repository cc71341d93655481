//! Comparable reading positions
//!
//! A [`Position`] is the canonical "where" of anything stored against a book:
//! chapter boundaries, highlights, reading-session endpoints. Positions are
//! totally ordered by element index, then by character index, so every
//! consumer can answer containment and overlap questions with plain
//! comparisons, whether the position came from an EPUB address or a page number.
//!
//! # Usage
//!
//! ```ignore
//! use folio_xpoint::position::{Position, PositionRange};
//!
//! let chapter = PositionRange::new(Position::new(4, 0), Position::new(9, 120));
//! assert!(chapter.contains(Position::new(5, 37)));
//! assert!(Position::from_page(12) < Position::from_page(13));
//! ```

mod comparator;
mod types;

pub use comparator::{is_after, is_before, is_in_range};
pub use types::{Position, PositionRange};
