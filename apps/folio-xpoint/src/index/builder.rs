//! Index construction

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use super::table::{FragmentSpan, FragmentTable, PositionIndex};
use crate::dom::Document;
use crate::epub::ContentSource;
use crate::error::{IndexError, Result};
use crate::xpoint::normalize_path;

/// Bounds on the work one build may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLimits {
    pub max_units: usize,
    pub max_unit_bytes: usize,
    /// Whole-book element count
    pub max_elements: usize,
    pub timeout: Option<Duration>,
}

impl Default for IndexLimits {
    fn default() -> Self {
        Self {
            max_units: 10_000,
            max_unit_bytes: 32 * 1024 * 1024,
            max_elements: 5_000_000,
            timeout: None,
        }
    }
}

/// Builds [`PositionIndex`]es; holds no state between builds
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    limits: IndexLimits,
    parallel: bool,
}

/// One content unit's bytes, in spine position
struct LoadedUnit {
    fragment: u32,
    id: String,
    bytes: Vec<u8>,
}

/// Normalized paths of one unit's elements in document order
struct UnitWalk {
    fragment: u32,
    id: String,
    paths: Vec<String>,
}

impl Indexer {
    pub fn new(limits: IndexLimits) -> Self {
        Self {
            limits,
            parallel: false,
        }
    }

    /// Walk units concurrently on the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn limits(&self) -> &IndexLimits {
        &self.limits
    }

    /// Build the index for one book
    ///
    /// All-or-nothing: any unreadable or malformed unit fails the build.
    pub fn build<S>(&self, book_id: &str, source: &S) -> Result<PositionIndex>
    where
        S: ContentSource + ?Sized,
    {
        let started = Instant::now();
        // A timeout too large to represent as an instant means no deadline
        let deadline = self
            .limits
            .timeout
            .and_then(|t| started.checked_add(t).map(|at| (at, t)));

        let (units, digest) = self.load_units(book_id, source, deadline)?;
        tracing::debug!(
            "Loaded {} content units for book {} in {:?}",
            units.len(),
            book_id,
            started.elapsed()
        );

        let walks = if self.parallel {
            units
                .par_iter()
                .map(|unit| self.walk_unit(book_id, unit, deadline))
                .collect::<Result<Vec<_>>>()?
        } else {
            units
                .iter()
                .map(|unit| self.walk_unit(book_id, unit, deadline))
                .collect::<Result<Vec<_>>>()?
        };

        let (fragments, elements) = self.assign(book_id, walks)?;

        tracing::info!(
            "Indexed book {}: {} fragments, {} elements in {:?}",
            book_id,
            fragments.len(),
            elements,
            started.elapsed()
        );

        Ok(PositionIndex::new(
            book_id.to_string(),
            digest,
            fragments,
            elements,
        ))
    }

    /// Read every unit in spine order, enforcing limits and hashing content
    fn load_units<S>(
        &self,
        book_id: &str,
        source: &S,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<(Vec<LoadedUnit>, String)>
    where
        S: ContentSource + ?Sized,
    {
        let spine = source.spine().map_err(|source| IndexError::Content {
            book_id: book_id.to_string(),
            source,
        })?;

        if spine.is_empty() {
            return Err(IndexError::EmptySpine {
                book_id: book_id.to_string(),
            });
        }
        if spine.len() > self.limits.max_units {
            return Err(self.limit(book_id, "spine units", self.limits.max_units));
        }

        let mut hasher = Sha256::new();
        let mut units = Vec::with_capacity(spine.len());
        for (slot, id) in spine.into_iter().enumerate() {
            check_deadline(book_id, deadline)?;

            let bytes = source.read_unit(&id).map_err(|source| IndexError::Content {
                book_id: book_id.to_string(),
                source,
            })?;
            if bytes.len() > self.limits.max_unit_bytes {
                return Err(self.limit(book_id, "unit bytes", self.limits.max_unit_bytes));
            }

            hasher.update((id.len() as u64).to_le_bytes());
            hasher.update(id.as_bytes());
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);

            units.push(LoadedUnit {
                fragment: slot as u32 + 1,
                id,
                bytes,
            });
        }

        Ok((units, hex::encode(hasher.finalize())))
    }

    /// Parse one unit and list its body elements in document order
    fn walk_unit(
        &self,
        book_id: &str,
        unit: &LoadedUnit,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<UnitWalk> {
        check_deadline(book_id, deadline)?;

        let doc = Document::parse(&unit.bytes).map_err(|source| IndexError::Markup {
            book_id: book_id.to_string(),
            fragment: unit.fragment,
            unit: unit.id.clone(),
            source,
        })?;

        let paths: Vec<String> = match doc.find_child(doc.root(), "body") {
            Some(body) => doc
                .descendants(body)
                .filter_map(|id| doc.path_of(id))
                .map(|path| normalize_path(strip_root_segment(&path)))
                .collect(),
            None => {
                tracing::debug!(
                    "Fragment {} ({}) of book {} has no body",
                    unit.fragment,
                    unit.id,
                    book_id
                );
                Vec::new()
            }
        };

        if paths.len() > self.limits.max_elements {
            return Err(self.limit(book_id, "elements", self.limits.max_elements));
        }

        Ok(UnitWalk {
            fragment: unit.fragment,
            id: unit.id.clone(),
            paths,
        })
    }

    /// Number elements across units, threading the running total through a fold
    fn assign(&self, book_id: &str, walks: Vec<UnitWalk>) -> Result<(Vec<FragmentTable>, u32)> {
        let max_elements = self.limits.max_elements.min(u32::MAX as usize);

        let (tables, total) = walks.into_iter().try_fold(
            (Vec::new(), 0usize),
            |(mut tables, base), walk| {
                let count = walk.paths.len();
                let total = base + count;
                if total > max_elements {
                    return Err(self.limit(book_id, "elements", max_elements));
                }

                let first = base as u32 + 1;
                let entries: HashMap<String, u32> = walk
                    .paths
                    .into_iter()
                    .zip(first..)
                    .collect();

                tables.push(FragmentTable {
                    span: FragmentSpan {
                        fragment: walk.fragment,
                        unit: walk.id,
                        first,
                        count: count as u32,
                    },
                    entries,
                });
                Ok((tables, total))
            },
        )?;

        Ok((tables, total as u32))
    }

    fn limit(&self, book_id: &str, limit: &'static str, max: usize) -> IndexError {
        tracing::warn!("Book {} exceeds the {} limit of {}", book_id, limit, max);
        IndexError::LimitExceeded {
            book_id: book_id.to_string(),
            limit,
            max: max as u64,
        }
    }
}

fn check_deadline(book_id: &str, deadline: Option<(Instant, Duration)>) -> Result<()> {
    match deadline {
        Some((at, timeout)) if Instant::now() >= at => Err(IndexError::DeadlineExceeded {
            book_id: book_id.to_string(),
            timeout,
        }),
        _ => Ok(()),
    }
}

/// Drop the document root (`/html[1]`) so paths start at `body`
fn strip_root_segment(path: &str) -> &str {
    match path.get(1..).and_then(|rest| rest.find('/')) {
        Some(at) => &path[at + 1..],
        None => "",
    }
}
