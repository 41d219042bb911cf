//! In-memory blob store (tests and dry runs)

use super::traits::{validate_path, BlobStore, StorageResult};
use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    documents: DashMap<String, Value>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn save(&self, path: &str, document: &Value) -> StorageResult<()> {
        validate_path(path)?;
        self.documents.insert(path.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, path: &str) -> StorageResult<Option<Value>> {
        validate_path(path)?;
        Ok(self.documents.get(path).map(|r| r.value().clone()))
    }
}
