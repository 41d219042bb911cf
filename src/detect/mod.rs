//! Auto-detection of motif and ATU evidence
//!
//! The detector itself is an external service reached through
//! [`EvidenceDetector`]; this module plans the per-section requests and
//! merges what comes back.

mod aggregator;
mod detector;

pub use aggregator::{
    plan_requests, AggregatedEvidence, AggregationError, EvidenceAggregator, ScoredLabel,
    SectionRequest,
};
pub use detector::{Detection, DetectorError, EvidenceDetector, LabelScore, MockDetector};
