//! Address resolution
//!
//! Turns device location strings into [`Position`]s against a built
//! [`PositionIndex`]. Resolution never fails with an error: malformed
//! addresses and addresses naming elements the index does not know come back
//! as [`Resolution::Unresolved`], so one bad address cannot abort a batch.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::index::PositionIndex;
use crate::position::Position;
use crate::xpoint::{self, normalize_path, ParsedLocation, XPointParseError};

/// Normalized path of a fragment's `body` element
const BODY_PATH: &str = "/body[1]";

/// What to do with an address that has no `DocFragment` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmittedFragmentPolicy {
    /// Treat it as fragment 1
    #[serde(rename = "first")]
    AssumeFirst,
    /// Leave it unresolved when the book has more than one fragment
    #[serde(rename = "reject")]
    Reject,
}

impl Default for OmittedFragmentPolicy {
    fn default() -> Self {
        OmittedFragmentPolicy::AssumeFirst
    }
}

impl FromStr for OmittedFragmentPolicy {
    type Err = String;

    /// Accepts the serde names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(OmittedFragmentPolicy::AssumeFirst),
            "reject" => Ok(OmittedFragmentPolicy::Reject),
            other => Err(format!("unknown omitted-fragment policy: {}", other)),
        }
    }
}

/// Why an address did not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The string does not follow the address grammar
    Malformed(XPointParseError),
    /// The book has no such fragment
    UnknownFragment(u32),
    /// The fragment has no element at this path
    UnknownElement { fragment: u32, path: String },
    /// No fragment given and the book has several
    AmbiguousFragment { fragments: usize },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::Malformed(e) => write!(f, "malformed address: {}", e),
            UnresolvedReason::UnknownFragment(n) => write!(f, "no fragment {}", n),
            UnresolvedReason::UnknownElement { fragment, path } => {
                write!(f, "no element {} in fragment {}", path, fragment)
            }
            UnresolvedReason::AmbiguousFragment { fragments } => write!(
                f,
                "address names no fragment and the book has {}",
                fragments
            ),
        }
    }
}

/// Outcome of resolving one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Position),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn position(&self) -> Option<Position> {
        match self {
            Resolution::Resolved(position) => Some(*position),
            Resolution::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn reason(&self) -> Option<&UnresolvedReason> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Unresolved(reason) => Some(reason),
        }
    }
}

/// Resolves addresses against one book's index
///
/// Cheap to clone; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Resolver {
    index: Arc<PositionIndex>,
    policy: OmittedFragmentPolicy,
}

impl Resolver {
    pub fn new(index: Arc<PositionIndex>) -> Self {
        Self {
            index,
            policy: OmittedFragmentPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OmittedFragmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    /// Resolve a raw address string
    pub fn resolve(&self, address: &str) -> Resolution {
        match xpoint::parse(address) {
            Ok(location) => self.resolve_location(&location),
            Err(e) => {
                tracing::debug!("Unparseable address {:?}: {}", address, e);
                Resolution::Unresolved(UnresolvedReason::Malformed(e))
            }
        }
    }

    /// Resolve an already parsed address
    pub fn resolve_location(&self, location: &ParsedLocation) -> Resolution {
        let fragment = match self.effective_fragment(location) {
            Ok(fragment) => fragment,
            Err(reason) => return Resolution::Unresolved(reason),
        };

        let Some(span) = self.index.fragment_span(fragment) else {
            return Resolution::Unresolved(UnresolvedReason::UnknownFragment(fragment));
        };

        let path = normalize_path(&location.path);
        let found = match self.index.get(fragment, &path) {
            Some(index) => Some(index),
            // The body itself stands for the start of its fragment
            None if path == BODY_PATH && span.count > 0 => Some(span.first),
            None => None,
        };

        match found {
            Some(index) => Resolution::Resolved(Position::new(index, location.char_offset())),
            None => Resolution::Unresolved(UnresolvedReason::UnknownElement { fragment, path }),
        }
    }

    /// Resolve many addresses, one result per input in input order
    pub fn resolve_all<I, S>(&self, addresses: I) -> Vec<Resolution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let results: Vec<Resolution> = addresses
            .into_iter()
            .map(|address| self.resolve(address.as_ref()))
            .collect();

        let resolved = results.iter().filter(|r| r.is_resolved()).count();
        tracing::debug!(
            "Resolved {}/{} addresses for book {}",
            resolved,
            results.len(),
            self.index.book_id()
        );

        results
    }

    fn effective_fragment(&self, location: &ParsedLocation) -> Result<u32, UnresolvedReason> {
        if let Some(fragment) = location.fragment {
            return Ok(fragment);
        }

        let fragments = self.index.fragment_count();
        if fragments <= 1 {
            return Ok(1);
        }

        match self.policy {
            OmittedFragmentPolicy::AssumeFirst => {
                tracing::debug!(
                    "Address {} has no fragment; assuming 1 of {} in book {}",
                    location,
                    fragments,
                    self.index.book_id()
                );
                Ok(1)
            }
            OmittedFragmentPolicy::Reject => {
                Err(UnresolvedReason::AmbiguousFragment { fragments })
            }
        }
    }
}
