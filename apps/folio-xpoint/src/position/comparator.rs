//! Position comparison helpers
//!
//! Thin named wrappers over [`Position`]'s ordering, for call sites that read
//! better as reading-order questions.

use super::types::Position;

/// Determine if `a` comes before `b` in reading order
pub fn is_before(a: Position, b: Position) -> bool {
    a < b
}

/// Determine if `a` comes after `b` in reading order
pub fn is_after(a: Position, b: Position) -> bool {
    a > b
}

/// Check if a position falls within `start..=end`
pub fn is_in_range(position: Position, start: Position, end: Position) -> bool {
    position >= start && position <= end
}
