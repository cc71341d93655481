//! EPUB content source using rbook

use std::io::{Read, Seek};
use std::path::Path;

use rbook::prelude::*;
use rbook::Epub;

use super::source::{ContentError, ContentSource};

/// An open EPUB archive
pub struct EpubSource {
    epub: Epub,
}

impl EpubSource {
    /// Open an EPUB from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        // Lenient parsing: missing metadata must not block indexing
        let epub = Epub::options()
            .strict(false)
            .open(path.as_ref())
            .map_err(|e| ContentError::OpenError(e.to_string()))?;

        Ok(Self { epub })
    }

    /// Open an EPUB from an in-memory or streamed archive
    pub fn from_reader<R: Read + Seek + Send + Sync + 'static>(
        reader: R,
    ) -> Result<Self, ContentError> {
        let epub = Epub::options()
            .strict(false)
            .read(reader)
            .map_err(|e| ContentError::OpenError(e.to_string()))?;

        Ok(Self { epub })
    }
}

impl ContentSource for EpubSource {
    /// Spine idrefs, linear and non-linear alike
    fn spine(&self) -> Result<Vec<String>, ContentError> {
        Ok(self
            .epub
            .spine()
            .entries()
            .map(|item| item.idref().to_string())
            .collect())
    }

    fn read_unit(&self, id: &str) -> Result<Vec<u8>, ContentError> {
        let manifest = self.epub.manifest();
        let manifest_item = manifest
            .by_id(id)
            .ok_or_else(|| ContentError::MissingManifestItem(id.to_string()))?;

        self.epub
            .read_resource_bytes(manifest_item.href())
            .map_err(|e| ContentError::ReadError(e.to_string()))
    }
}
