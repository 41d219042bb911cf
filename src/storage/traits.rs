//! Storage trait definitions

use crate::schema::SchemaError;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque JSON blob store keyed by a relative, `/`-separated path
///
/// Implementations must be thread-safe (Send + Sync). Saving to an existing
/// path replaces the document.
pub trait BlobStore: Send + Sync {
    /// Store a document at `path`
    fn save(&self, path: &str, document: &Value) -> StorageResult<()>;

    /// Load the document at `path`, or `None` if nothing is stored there
    fn load(&self, path: &str) -> StorageResult<Option<Value>>;

    /// Check whether a document exists at `path`
    fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.load(path)?.is_some())
    }
}

/// Reject absolute paths and parent traversal.
pub(crate) fn validate_path(path: &str) -> StorageResult<()> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|part| part == ".." || part.is_empty());
    if invalid {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_accepted() {
        assert!(validate_path("json_v3/tiger_aunt_v3.json").is_ok());
    }

    #[test]
    fn traversal_and_absolute_paths_are_rejected() {
        for bad in ["", "/etc/passwd", "../x.json", "a/../b.json", "a//b.json", "a\\b.json"] {
            assert!(
                matches!(validate_path(bad), Err(StorageError::InvalidPath(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
