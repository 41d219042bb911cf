//! Filesystem-backed blob store

use super::traits::{validate_path, BlobStore, StorageResult};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Stores each document as pretty-printed JSON under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }
}

impl BlobStore for FsBlobStore {
    /// Writes to a sibling temp file and renames it into place.
    fn save(&self, path: &str, document: &Value) -> StorageResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut body = serde_json::to_string_pretty(document)?;
        body.push('\n');

        let tmp = target.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &target)?;
        tracing::info!(path = %target.display(), "saved annotation document");
        Ok(())
    }

    fn load(&self, path: &str) -> StorageResult<Option<Value>> {
        let target = self.resolve(path)?;
        let body = match std::fs::read_to_string(&target) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&body)?))
    }

    fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.resolve(path)?.is_file())
    }
}
