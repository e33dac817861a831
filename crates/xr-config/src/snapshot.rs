//! Configuration snapshots for diagnostics.
//!
//! A snapshot records which configuration a run used, so a surprising
//! rendering or priority can be traced back to the file that caused it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::config::Config;
use crate::resolve::ConfigSource;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the config JSON content.
    #[serde(default)]
    pub hash: Option<String>,

    /// Path the config was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the configuration.
    pub source: String,

    /// Number of user atom mappings.
    pub mapping_count: usize,
}

impl ConfigSnapshot {
    /// Create a new snapshot from loaded configuration.
    pub fn new(
        config: &Config,
        path: Option<&Path>,
        source: &ConfigSource,
        json: Option<&str>,
    ) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            hash: json.map(hash_content),
            path: path.map(|p| p.display().to_string()),
            source: source.to_string(),
            mapping_count: config.mappings.len(),
        }
    }

    /// Create a snapshot with only defaults (no config file loaded).
    pub fn defaults_only() -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            hash: None,
            path: None,
            source: ConfigSource::BuiltinDefault.to_string(),
            mapping_count: 0,
        }
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        match &self.hash {
            Some(hash) => &hash[..12.min(hash.len())],
            None => "defaults",
        }
    }
}

/// Hex-encoded SHA-256 of the content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
