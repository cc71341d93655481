//! Folio position indexing
//!
//! Turns e-reader location strings into comparable reading positions.
//!
//! # Modules
//!
//! - `xpoint`: location-string grammar, parser and path normalization
//! - `dom`: element arena for XHTML content documents
//! - `epub`: content access (spine + unit bytes) over EPUB archives
//! - `index`: whole-book position index construction
//! - `resolver`: address → [`Position`] resolution against an index
//! - `position`: the comparable position type and range helpers
//! - `cache`: in-memory index cache and background indexing
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_xpoint::{EpubSource, Indexer, Resolver};
//!
//! let source = EpubSource::from_path("book.epub")?;
//! let index = Indexer::default().parallel(true).build("book-1", &source)?;
//! let resolver = Resolver::new(Arc::new(index));
//!
//! let position = resolver
//!     .resolve("/body/DocFragment[3]/body/div/p[2]/text().14")
//!     .position();
//! ```

pub mod cache;
pub mod config;
pub mod dom;
pub mod epub;
pub mod error;
pub mod index;
pub mod position;
pub mod resolver;
pub mod xpoint;

pub use cache::{IndexingService, PositionIndexCache};
pub use config::Config;
pub use epub::{ContentError, ContentSource, EpubSource, MemorySource};
pub use error::{IndexError, Result};
pub use index::{IndexLimits, Indexer, PositionIndex};
pub use position::{Position, PositionRange};
pub use resolver::{OmittedFragmentPolicy, Resolution, Resolver, UnresolvedReason};
pub use xpoint::ParsedLocation;
