//! Configuration validation errors and semantic validation.
//!
//! Format strings inside mappings are checked later, when they are
//! registered; this module only checks the document's shape and ranges.

use thiserror::Error;

use crate::config::Config;
use crate::{CONFIG_SCHEMA_VERSION, HIGHEST_PRIORITY, LOWEST_PRIORITY};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a parsed configuration semantically.
pub fn validate_config(config: &Config) -> ValidationResult<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if let Some(priority) = config.priority {
        if !(HIGHEST_PRIORITY..=LOWEST_PRIORITY).contains(&priority) {
            return Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!(
                    "Must be in [{}, {}], got {}",
                    HIGHEST_PRIORITY, LOWEST_PRIORITY, priority
                ),
            });
        }
    }

    if let Some(property) = &config.property {
        if property.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "property".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
    }

    if config.max_length == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "max_length".to_string(),
            message: "Must be positive".to_string(),
        });
    }

    for (idx, mapping) in config.mappings.iter().enumerate() {
        if mapping.atom.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("mappings[{}].atom", idx),
                message: "Must not be empty".to_string(),
            });
        }
        if mapping.format.is_none() && mapping.dformat.is_none() {
            return Err(ValidationError::InvalidValue {
                field: format!("mappings[{}]", idx),
                message: format!(
                    "Mapping for {} needs a format, a dformat, or both",
                    mapping.atom
                ),
            });
        }
    }

    Ok(())
}
