//! E-reader location strings ("xpoints")
//!
//! Reading devices report positions as a structural path into one of the
//! book's content documents, optionally prefixed with the document's place in
//! the spine and suffixed with a character offset.
//!
//! # Example
//!
//! ```text
//! /body/DocFragment[3]/body/div[2]/p[5]/text().42
//! │                 │  │                     └── character offset 42
//! │                 │  └──────────────────────── path inside the content document
//! │                 └─────────────────────────── 1-based spine position (fragment)
//! └───────────────────────────────────────────── fragment prefix (optional)
//! ```
//!
//! Paths written by devices may omit sibling indices that equal 1
//! (`/body/div/p`); [`normalize_path`] maps both spellings onto one key.
//!
//! # Usage
//!
//! ```ignore
//! use folio_xpoint::xpoint::{parse, normalize_path};
//!
//! let location = parse("/body/DocFragment[2]/body/p[3]/text().17").unwrap();
//! assert_eq!(location.fragment, Some(2));
//! assert_eq!(location.char_offset(), 17);
//! assert_eq!(normalize_path(&location.path), "/body[1]/p[3]");
//! ```

mod normalize;
mod parser;
mod types;

pub use normalize::normalize_path;
pub use parser::{parse, try_parse, XPointParseError};
pub use types::ParsedLocation;
