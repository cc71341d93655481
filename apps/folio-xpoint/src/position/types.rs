//! Position value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point inside a book
///
/// Ordering is derived from field order: `index` first, then `char_index`.
/// Serialized as the two-element array `[index, char_index]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Position {
    /// Element rank in whole-book document order (or page number)
    pub index: u32,
    /// Character offset inside the element's text
    pub char_index: u32,
}

impl Position {
    pub fn new(index: u32, char_index: u32) -> Self {
        Self { index, char_index }
    }

    /// Position of a page-addressed location (PDF and other non-EPUB material)
    pub fn from_page(page: u32) -> Self {
        Self::new(page, 0)
    }
}

impl From<(u32, u32)> for Position {
    fn from((index, char_index): (u32, u32)) -> Self {
        Self::new(index, char_index)
    }
}

impl From<Position> for (u32, u32) {
    fn from(position: Position) -> Self {
        (position.index, position.char_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.index, self.char_index)
    }
}

/// An inclusive span of positions, e.g. a chapter or a reading session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionRange {
    pub start: Position,
    pub end: Position,
}

impl PositionRange {
    /// Create a range; endpoints are swapped if given out of order
    pub fn new(start: Position, end: Position) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// `start <= position <= end`
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Whether the two ranges share at least one position
    pub fn overlaps(&self, other: &PositionRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}
