//! Versioned annotation documents on top of a blob store
//!
//! Each story has one document per schema version, kept in sibling
//! directories of the source-text directory:
//!
//! ```text
//! stories/texts/tiger_aunt.txt
//! stories/json/tiger_aunt.json
//! stories/json_v2/tiger_aunt_v2.json
//! stories/json_v3/tiger_aunt_v3.json
//! ```

use super::traits::{BlobStore, StorageResult};
use crate::config::LayoutConfig;
use crate::model::AnnotationDocument;
use crate::schema::{self, RawDocument, SchemaVersion};
use std::sync::Arc;

/// Loads and saves canonical documents in any schema version.
pub struct AnnotationRepository {
    store: Arc<dyn BlobStore>,
    layout: LayoutConfig,
}

impl AnnotationRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            layout: LayoutConfig::default(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Store path for a story in one version.
    ///
    /// `source_dir` is the directory holding the source texts; version
    /// directories are its siblings.
    pub fn path_for(&self, source_dir: &str, base: &str, version: SchemaVersion) -> String {
        let source_dir = source_dir.trim_end_matches('/');
        let parent = source_dir.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
        let file = format!("{}{}.json", base, version.file_suffix());
        let dir = self.layout.dir_for(version);
        if parent.is_empty() {
            format!("{}/{}", dir, file)
        } else {
            format!("{}/{}/{}", parent, dir, file)
        }
    }

    /// Load and normalize the document at `path`, reporting the version it was stored in.
    pub fn load_document(
        &self,
        path: &str,
    ) -> StorageResult<Option<(AnnotationDocument, SchemaVersion)>> {
        let Some(value) = self.store.load(path)? else {
            return Ok(None);
        };
        let raw = RawDocument::detect(value)?;
        tracing::debug!(path, version = %raw.version(), "loaded annotation document");
        Ok(Some((schema::read(&raw), raw.version())))
    }

    /// Load the newest version stored for a story.
    pub fn load_latest(
        &self,
        source_dir: &str,
        base: &str,
    ) -> StorageResult<Option<(AnnotationDocument, SchemaVersion)>> {
        for version in SchemaVersion::ALL.iter().rev() {
            let path = self.path_for(source_dir, base, *version);
            if let Some(found) = self.load_document(&path)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Write `doc` to `path` in `version`.
    pub fn save_document(
        &self,
        path: &str,
        doc: &AnnotationDocument,
        version: SchemaVersion,
    ) -> StorageResult<()> {
        let raw = schema::write(doc, version);
        self.store.save(path, raw.as_value())
    }

    /// Write `doc` in every version at its layout path. Returns the paths written.
    pub fn save_all_versions(
        &self,
        source_dir: &str,
        base: &str,
        doc: &AnnotationDocument,
    ) -> StorageResult<Vec<String>> {
        let mut written = Vec::with_capacity(SchemaVersion::ALL.len());
        for version in SchemaVersion::ALL {
            let path = self.path_for(source_dir, base, version);
            self.save_document(&path, doc, version)?;
            written.push(path);
        }
        Ok(written)
    }
}
