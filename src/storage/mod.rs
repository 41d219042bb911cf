//! Storage backends for annotation documents
//!
//! Documents are opaque JSON blobs behind the `BlobStore` trait.
//! `AnnotationRepository` layers version detection, normalization and the
//! per-version directory layout on top.

mod fs;
mod memory;
mod repository;
mod traits;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use repository::AnnotationRepository;
pub use traits::{BlobStore, StorageError, StorageResult};
