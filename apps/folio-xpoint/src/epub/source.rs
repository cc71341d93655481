//! Content source contract

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to open EPUB: {0}")]
    OpenError(String),
    #[error("Spine item {0} has no manifest entry")]
    MissingManifestItem(String),
    #[error("Content unit not found: {0}")]
    UnitNotFound(String),
    #[error("Failed to read content: {0}")]
    ReadError(String),
}

/// Read access to a book's content units
pub trait ContentSource {
    /// Identifiers of the content units in reading order
    ///
    /// The 1-based position of an id in this list is its fragment number.
    fn spine(&self) -> Result<Vec<String>, ContentError>;

    /// Raw bytes of one content unit
    fn read_unit(&self, id: &str) -> Result<Vec<u8>, ContentError>;
}

/// Content units held in memory, in spine order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    units: Vec<(String, Vec<u8>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit to the end of the spine
    pub fn with_unit(mut self, id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.push(id, content);
        self
    }

    pub fn push(&mut self, id: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.units.push((id.into(), content.into()));
    }
}

impl ContentSource for MemorySource {
    fn spine(&self) -> Result<Vec<String>, ContentError> {
        Ok(self.units.iter().map(|(id, _)| id.clone()).collect())
    }

    fn read_unit(&self, id: &str) -> Result<Vec<u8>, ContentError> {
        self.units
            .iter()
            .find(|(unit_id, _)| unit_id == id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| ContentError::UnitNotFound(id.to_string()))
    }
}
