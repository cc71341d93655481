//! Parsed location types

use std::fmt;

/// Literal prefix naming the fragment (spine position) of an address
pub(crate) const FRAGMENT_PREFIX: &str = "/body/DocFragment[";

/// Literal suffix introducing the character offset of an address
pub(crate) const TEXT_SUFFIX: &str = "/text()";

/// A structurally valid location string, not yet resolved against a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    /// 1-based fragment number, if the address named one
    pub fragment: Option<u32>,
    /// Path inside the content document, as written (`/body/div/p[2]`)
    pub path: String,
    /// Character offset, if the address carried a `/text().N` suffix
    pub offset: Option<u32>,
}

impl ParsedLocation {
    pub fn new(fragment: Option<u32>, path: impl Into<String>) -> Self {
        Self {
            fragment,
            path: path.into(),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Character offset with the absent-means-zero rule applied
    pub fn char_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

impl fmt::Display for ParsedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fragment) = self.fragment {
            write!(f, "{}{}]", FRAGMENT_PREFIX, fragment)?;
        }
        write!(f, "{}", self.path)?;
        if let Some(offset) = self.offset {
            write!(f, "{}.{}", TEXT_SUFFIX, offset)?;
        }
        Ok(())
    }
}

/// First character of a tag name
pub(crate) fn is_tag_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Any later character of a tag name
pub(crate) fn is_tag_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':')
}
