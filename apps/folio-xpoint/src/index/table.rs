//! The built, read-only position table

use std::collections::HashMap;

use serde::Serialize;

/// Element numbers assigned to one fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentSpan {
    /// 1-based spine position
    pub fragment: u32,
    /// Spine id of the content unit
    pub unit: String,
    /// First element number in this fragment (meaningless when `count == 0`)
    pub first: u32,
    /// Number of indexed elements
    pub count: u32,
}

impl FragmentSpan {
    /// Last element number, if the fragment has any elements
    pub fn last(&self) -> Option<u32> {
        (self.count > 0).then(|| self.first + self.count - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FragmentTable {
    pub(super) span: FragmentSpan,
    pub(super) entries: HashMap<String, u32>,
}

/// Immutable map from `(fragment, normalized path)` to element number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionIndex {
    book_id: String,
    digest: String,
    /// `fragments[n - 1]` is fragment `n`
    fragments: Vec<FragmentTable>,
    elements: u32,
}

/// Serializable overview of an index
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub book_id: String,
    pub digest: String,
    pub fragments: usize,
    pub elements: u32,
    pub spans: Vec<FragmentSpan>,
}

impl PositionIndex {
    pub(super) fn new(
        book_id: String,
        digest: String,
        fragments: Vec<FragmentTable>,
        elements: u32,
    ) -> Self {
        Self {
            book_id,
            digest,
            fragments,
            elements,
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// SHA-256 (hex) of the spine ids and unit bytes this index was built from
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Number of content units in the spine
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Total number of indexed elements
    pub fn len(&self) -> usize {
        self.elements as usize
    }

    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    /// Element number for a normalized path in a fragment
    pub fn get(&self, fragment: u32, normalized_path: &str) -> Option<u32> {
        self.table(fragment)?.entries.get(normalized_path).copied()
    }

    pub fn fragment_span(&self, fragment: u32) -> Option<&FragmentSpan> {
        self.table(fragment).map(|t| &t.span)
    }

    pub fn spans(&self) -> impl Iterator<Item = &FragmentSpan> {
        self.fragments.iter().map(|t| &t.span)
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            book_id: self.book_id.clone(),
            digest: self.digest.clone(),
            fragments: self.fragments.len(),
            elements: self.elements,
            spans: self.spans().cloned().collect(),
        }
    }

    fn table(&self, fragment: u32) -> Option<&FragmentTable> {
        let slot = (fragment as usize).checked_sub(1)?;
        self.fragments.get(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(fragment: u32, first: u32, paths: &[&str]) -> FragmentTable {
        FragmentTable {
            span: FragmentSpan {
                fragment,
                unit: format!("u{}", fragment),
                first,
                count: paths.len() as u32,
            },
            entries: paths
                .iter()
                .enumerate()
                .map(|(i, p)| (p.to_string(), first + i as u32))
                .collect(),
        }
    }

    #[test]
    fn test_lookup() {
        let index = PositionIndex::new(
            "b".to_string(),
            "d".to_string(),
            vec![
                table(1, 1, &["/body[1]/p[1]"]),
                table(2, 2, &["/body[1]/p[1]", "/body[1]/p[2]"]),
            ],
            3,
        );

        assert_eq!(index.get(1, "/body[1]/p[1]"), Some(1));
        assert_eq!(index.get(2, "/body[1]/p[2]"), Some(3));
        assert_eq!(index.get(0, "/body[1]/p[1]"), None);
        assert_eq!(index.get(3, "/body[1]/p[1]"), None);
        assert_eq!(index.fragment_count(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_span_last() {
        let span = FragmentSpan {
            fragment: 2,
            unit: "ch2".to_string(),
            first: 4,
            count: 3,
        };
        assert_eq!(span.last(), Some(6));

        let empty = FragmentSpan { count: 0, ..span };
        assert_eq!(empty.last(), None);
    }
}
