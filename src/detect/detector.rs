//! Evidence detector client: the label-detection service behind auto-annotation
//!
//! The detector scores a text against the ATU tale-type index and the motif
//! index and returns the top matches per axis. Two pieces live here:
//! - `EvidenceDetector`: the client trait the aggregator calls
//! - `MockDetector`: returns preconfigured responses (testing)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One label match and its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub similarity: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, similarity: f32) -> Self {
        Self {
            label: label.into(),
            similarity,
        }
    }
}

/// Detector output for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub atu: Vec<LabelScore>,
    #[serde(default)]
    pub motifs: Vec<LabelScore>,
}

impl Detection {
    pub fn new(atu: Vec<LabelScore>, motifs: Vec<LabelScore>) -> Self {
        Self { atu, motifs }
    }

    /// Parse a detector response body.
    ///
    /// Model-backed detectors sometimes wrap the JSON in a fenced block or
    /// surround it with prose. This tries, in order:
    /// 1. Direct parse
    /// 2. The contents of a ```json or ``` fenced block
    /// 3. The span from the first `{` to the last `}`
    pub fn parse(body: &str) -> Result<Self, DetectorError> {
        let trimmed = body.trim();

        if let Ok(d) = serde_json::from_str::<Detection>(trimmed) {
            return Ok(d);
        }

        let fenced = if let Some(start) = trimmed.find("```json") {
            let after = &trimmed[start + 7..];
            after.find("```").map(|end| &after[..end])
        } else if let Some(start) = trimmed.find("```\n") {
            let after = &trimmed[start + 4..];
            after.find("```").map(|end| &after[..end])
        } else {
            None
        };
        if let Some(block) = fenced {
            if let Ok(d) = serde_json::from_str::<Detection>(block.trim()) {
                return Ok(d);
            }
        }

        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                if let Ok(d) = serde_json::from_str::<Detection>(&trimmed[start..=end]) {
                    return Ok(d);
                }
            }
        }

        Err(DetectorError::ParseError(format!(
            "no detection object in response ({} bytes)",
            body.len()
        )))
    }
}

/// Errors from detector calls.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("detector not available: {0}")]
    Unavailable(String),
    #[error("detection request failed: {0}")]
    RequestFailed(String),
    #[error("detector response parse error: {0}")]
    ParseError(String),
}

/// Client trait for the label detector.
///
/// Timeouts and retries belong to implementations; the aggregator treats
/// any error as a failed request.
#[async_trait]
pub trait EvidenceDetector: Send + Sync {
    /// Score `text` and return up to `top_k` labels per axis.
    async fn detect(&self, text: &str, top_k: usize) -> Result<Detection, DetectorError>;
}

/// Mock detector for testing: answers by exact request text.
///
/// Texts with no registered response get an empty detection.
#[derive(Default)]
pub struct MockDetector {
    responses: HashMap<String, Detection>,
    failures: Vec<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for a request text.
    pub fn with_response(mut self, text: impl Into<String>, detection: Detection) -> Self {
        self.responses.insert(text.into(), detection);
        self
    }

    /// Make requests for this text fail.
    pub fn with_failure(mut self, text: impl Into<String>) -> Self {
        self.failures.push(text.into());
        self
    }

    /// Hold every request open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Request texts in the order they arrived.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Highest number of requests that were open at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvidenceDetector for MockDetector {
    async fn detect(&self, text: &str, top_k: usize) -> Result<Detection, DetectorError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.iter().any(|f| f == text) {
            return Err(DetectorError::RequestFailed(format!(
                "mock failure for text '{}'",
                text
            )));
        }

        let mut detection = self.responses.get(text).cloned().unwrap_or_default();
        detection.atu.truncate(top_k);
        detection.motifs.truncate(top_k);
        Ok(detection)
    }
}
