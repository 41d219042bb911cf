//! Configuration loaded from YAML
//!
//! Every field has a default, so an absent or partial file is fine.

use crate::schema::SchemaVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ceiling on per-section detection requests for one aggregation run.
pub const DEFAULT_MAX_SECTION_REQUESTS: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Directory names for each version, relative to the source-text directory's parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub v1_dir: String,
    pub v2_dir: String,
    pub v3_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            v1_dir: "json".to_string(),
            v2_dir: "json_v2".to_string(),
            v3_dir: "json_v3".to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn dir_for(&self, version: SchemaVersion) -> &str {
        match version {
            SchemaVersion::V1 => &self.v1_dir,
            SchemaVersion::V2 => &self.v2_dir,
            SchemaVersion::V3 => &self.v3_dir,
        }
    }
}

/// Evidence detection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Sections queried per run; the longest request texts are kept.
    pub max_section_requests: usize,
    /// Requests open at the same time.
    pub max_in_flight: usize,
    /// Labels requested per axis per call.
    pub top_k: usize,
    /// Labels kept per axis after merging.
    pub max_labels: usize,
    pub include_whole_summary: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_section_requests: DEFAULT_MAX_SECTION_REQUESTS,
            max_in_flight: 4,
            top_k: 5,
            max_labels: 5,
            include_whole_summary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolkmarkConfig {
    /// Version written when none is requested.
    pub default_version: SchemaVersion,
    pub layout: LayoutConfig,
    pub detection: DetectionConfig,
}

impl Default for FolkmarkConfig {
    fn default() -> Self {
        Self {
            default_version: SchemaVersion::V3,
            layout: LayoutConfig::default(),
            detection: DetectionConfig::default(),
        }
    }
}

impl FolkmarkConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<config_dir>/folkmark/config.yaml`
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"));
        config_dir.join("folkmark").join("config.yaml")
    }
}
