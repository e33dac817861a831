//! The config.json document and its loader.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::resolve::{resolve_config, ConfigPath, ConfigSource};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_config, ValidationError, ValidationResult};
use crate::{DEFAULT_MAX_LENGTH, DEFAULT_PROPERTY};

/// User configuration.
///
/// Every field except `schema_version` is optional; unset values fall back
/// to built-in defaults or are overridden by CLI flags and environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Must equal [`crate::CONFIG_SCHEMA_VERSION`].
    pub schema_version: String,

    /// Default priority to apply when neither `-p` nor `XRENICEPRIO` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Attribute name to read the process id from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,

    /// Maximum property bytes fetched and rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Clamp requested priorities into the valid nice range.
    #[serde(default = "default_clamp")]
    pub clamp_priority: bool,

    /// Extra atom format mappings, registered after the built-in table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingConfig>,
}

fn default_clamp() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            priority: None,
            property: None,
            max_length: None,
            clamp_priority: true,
            mappings: Vec::new(),
        }
    }
}

/// A user-supplied atom mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Atom name (interned against the window system at startup).
    pub atom: String,

    /// Format spec, e.g. `"32c"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Display format spec, e.g. `" = $0+\n"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dformat: Option<String>,
}

impl Config {
    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = read_file(path)?;
        Self::parse_json(&content)
    }

    /// Parse config from a JSON string.
    pub fn parse_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Attribute name to read, with the built-in default applied.
    pub fn property_name(&self) -> &str {
        self.property.as_deref().unwrap_or(DEFAULT_PROPERTY)
    }

    /// Max length with the built-in default applied.
    pub fn effective_max_length(&self) -> usize {
        self.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }
}

/// A validated configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, read, parse and validate the configuration.
///
/// Missing configuration is not an error: built-in defaults are returned.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let ConfigPath { path, source } = resolve_config(cli_path);

    let Some(path) = path else {
        return Ok(LoadedConfig {
            config: Config::default(),
            path: None,
            source,
            snapshot: ConfigSnapshot::defaults_only(),
        });
    };

    let content = read_file(&path)?;
    let config = Config::parse_json(&content)?;
    validate_config(&config)?;

    let snapshot = ConfigSnapshot::new(&config, Some(&path), &source, Some(&content));

    Ok(LoadedConfig {
        config,
        path: Some(path),
        source,
        snapshot,
    })
}

fn read_file(path: &Path) -> ValidationResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = Config::parse_json(r#"{"schema_version": "1.0.0"}"#).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.property_name(), "_NET_WM_PID");
        assert_eq!(config.effective_max_length(), 500_000);
        assert!(config.clamp_priority);
    }

    #[test]
    fn test_parse_full() {
        let json = r#"{
            "schema_version": "1.0.0",
            "priority": 5,
            "property": "_NET_WM_PID",
            "max_length": 1024,
            "clamp_priority": false,
            "mappings": [
                {"atom": "_MY_PID", "format": "32c", "dformat": " = $0\n"},
                {"atom": "WM_NAME", "format": "8s"}
            ]
        }"#;
        let config = Config::parse_json(json).unwrap();
        assert_eq!(config.priority, Some(5));
        assert_eq!(config.effective_max_length(), 1024);
        assert!(!config.clamp_priority);
        assert_eq!(config.mappings.len(), 2);
        assert_eq!(config.mappings[1].dformat, None);
    }

    #[test]
    fn test_parse_rejects_missing_schema_version() {
        let err = Config::parse_json(r#"{"priority": 1}"#).unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn test_serialize_skips_unset() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(json, r#"{"schema_version":"1.0.0","clamp_priority":true}"#);
    }
}
