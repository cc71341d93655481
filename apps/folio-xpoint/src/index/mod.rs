//! Document position index
//!
//! Walks a book's content units in spine order and numbers every element
//! inside each unit's `body` in document order, continuing the numbering
//! across units. The resulting [`PositionIndex`] maps
//! `(fragment, normalized path)` to that number and is never modified after
//! it is built; a changed book is indexed again from scratch.
//!
//! # Architecture
//!
//! ```text
//!   ContentSource ──► load units (sequential, digest, limits)
//!                          │
//!            ┌─────────────┼─────────────┐
//!            ▼             ▼             ▼
//!        walk unit 1   walk unit 2 … walk unit N      (rayon, independent)
//!            │             │             │
//!            └──────► fold: base offsets in spine order
//!                          │
//!                          ▼
//!                    PositionIndex (immutable)
//! ```

mod builder;
mod table;

pub use builder::{IndexLimits, Indexer};
pub use table::{FragmentSpan, IndexSummary, PositionIndex};
