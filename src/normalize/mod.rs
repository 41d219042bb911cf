//! Normalization primitives shared by every schema reader and writer
//!
//! All functions here are pure and never fail: malformed input degrades to
//! the nearest empty value.

pub mod action;
pub mod evidence;
pub mod relationship;
pub mod span;

pub use action::FlatAction;
pub use relationship::{extract_english, reconcile, Reconciled, RelationshipMode};
pub use span::{derive_sections, section_key, stale_summary_keys, TextSection};
