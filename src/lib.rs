//! Folkmark: versioned annotation documents for folk-tale texts
//!
//! A story's annotation lives in one canonical, version-agnostic
//! `AnnotationDocument`. Three on-disk schema versions are read into it
//! and written back out of it:
//!
//! - **v1**: flat, a single relationship per event
//! - **v2**: nested, flat relationship fields plus `relationship_multi`
//! - **v3**: nested, a `relationships` list and an `action_layer` per event
//!
//! # Core Concepts
//!
//! - **Sections**: contiguous character ranges derived from event spans
//! - **Evidence maps**: which sections support each ATU type or motif label
//! - **Aggregation**: per-section label detection merged into evidence maps
//!
//! # Example
//!
//! ```
//! use folkmark::{schema, AnnotationDocument, SchemaVersion};
//!
//! let doc = AnnotationDocument::new("tiger_aunt", "Grandaunt Tiger", "Taiwan");
//! let raw = schema::write(&doc, SchemaVersion::V3);
//! let (read_back, version) = schema::read_value(raw.into_value()).unwrap();
//! assert_eq!(version, SchemaVersion::V3);
//! assert_eq!(read_back, doc);
//! ```

mod json;

pub mod annotate;
pub mod config;
pub mod detect;
pub mod migrate;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod storage;

pub use config::{ConfigError, DetectionConfig, FolkmarkConfig, LayoutConfig};
pub use detect::{AggregatedEvidence, AggregationError, EvidenceAggregator, EvidenceDetector};
pub use model::{
    ActionLayer, AnnotationDocument, EventType, EvidenceMap, NarrativeEvent, RelationshipEntry,
    TargetType, TextSpan, WHOLE_SUMMARY_KEY,
};
pub use normalize::{derive_sections, TextSection};
pub use schema::{RawDocument, SchemaError, SchemaResult, SchemaVersion};
pub use storage::{AnnotationRepository, BlobStore, FsBlobStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
