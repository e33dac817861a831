//! Error types for xrenice.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints (skip-and-report vs. hard failure)
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Format Error
//!   Reason: bad format: 12c
//!   Fix: Format sizes must be 0, 8, 16 or 32. Check the mappings in config.json.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 10,
//!   "category": "format",
//!   "message": "bad format: 12c",
//!   "recoverable": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::id::WindowId;

/// Result type alias for xrenice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Format spec / display format / decode errors.
    Format,
    /// Window system collaborator errors (connection, fetch, absent).
    Window,
    /// Process id and scheduling priority errors.
    Priority,
    /// Configuration file errors.
    Config,
    /// File I/O and serialization errors.
    Io,
    /// Platform compatibility errors.
    Platform,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Format => write!(f, "format"),
            ErrorCategory::Window => write!(f, "window"),
            ErrorCategory::Priority => write!(f, "priority"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Platform => write!(f, "platform"),
        }
    }
}

/// Unified error type for xrenice.
#[derive(Error, Debug)]
pub enum Error {
    // Format errors (10-19)
    #[error("bad format: {0}")]
    InvalidFormat(String),

    #[error("bad format character: {0}")]
    UnknownFormatChar(char),

    #[error("can't use format character '{tag}' with any size except {required} (actual size {size})")]
    BadFormatApplication { tag: char, required: u8, size: u8 },

    #[error("type mismatch: assumed size {declared} bits, actual size {actual} bits")]
    TypeSizeMismatch { declared: u8, actual: u8 },

    // Window system errors (20-29)
    #[error("cannot connect to window system: {0}")]
    Connection(String),

    #[error("window id # {window} does not exist")]
    NoSuchWindow { window: WindowId },

    #[error("property fetch failed: {0}")]
    PropertyFetchFailed(String),

    #[error("{name}: {detail}")]
    AttributeAbsent { name: String, detail: String },

    // Priority errors (30-39)
    #[error("invalid process id: {0:?}")]
    InvalidProcessId(String),

    #[error("process {pid} not found")]
    ProcessNotFound { pid: u32 },

    #[error("permission denied changing priority of process {pid}")]
    PermissionDenied { pid: u32 },

    #[error("priority operation failed: {0}")]
    PriorityFailed(String),

    // Configuration errors (40-49)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Platform errors (70-79)
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Format errors
    /// - 20-29: Window system errors
    /// - 30-39: Priority errors
    /// - 40-49: Configuration errors
    /// - 60-69: I/O errors
    /// - 70-79: Platform errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidFormat(_) => 10,
            Error::UnknownFormatChar(_) => 11,
            Error::BadFormatApplication { .. } => 12,
            Error::TypeSizeMismatch { .. } => 13,
            Error::Connection(_) => 20,
            Error::NoSuchWindow { .. } => 21,
            Error::PropertyFetchFailed(_) => 22,
            Error::AttributeAbsent { .. } => 23,
            Error::InvalidProcessId(_) => 30,
            Error::ProcessNotFound { .. } => 31,
            Error::PermissionDenied { .. } => 32,
            Error::PriorityFailed(_) => 33,
            Error::Config(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::UnsupportedPlatform(_) => 70,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidFormat(_)
            | Error::UnknownFormatChar(_)
            | Error::BadFormatApplication { .. }
            | Error::TypeSizeMismatch { .. } => ErrorCategory::Format,

            Error::Connection(_)
            | Error::NoSuchWindow { .. }
            | Error::PropertyFetchFailed(_)
            | Error::AttributeAbsent { .. } => ErrorCategory::Window,

            Error::InvalidProcessId(_)
            | Error::ProcessNotFound { .. }
            | Error::PermissionDenied { .. }
            | Error::PriorityFailed(_) => ErrorCategory::Priority,

            Error::Config(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,

            Error::UnsupportedPlatform(_) => ErrorCategory::Platform,
        }
    }

    /// Returns whether this error is an expected outcome rather than a defect.
    ///
    /// Recoverable errors are reported and the operation is skipped; the
    /// command still exits successfully.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TypeSizeMismatch { .. } | Error::AttributeAbsent { .. }
        )
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidFormat(_) => {
                "Format sizes must be 0, 8, 16 or 32 followed by type characters. Check the mappings in config.json."
            }
            Error::UnknownFormatChar(_) => {
                "Supported type characters are c, i, x, b, a, s, u, t and o."
            }
            Error::BadFormatApplication { .. } => {
                "String formats need 8-bit data and icon formats need 32-bit data. Fix the mapping for this atom."
            }
            Error::TypeSizeMismatch { .. } => {
                "The registered format disagrees with the property. Use a size of 0 to accept any width."
            }

            Error::Connection(_) => {
                "Check that DISPLAY is set and the X server is reachable, or pass --snapshot <file>."
            }
            Error::NoSuchWindow { .. } => {
                "The window was destroyed or the id is wrong. List windows with 'xwininfo -root -tree'."
            }
            Error::PropertyFetchFailed(_) => "Retry the command. If persistent, check the X server logs.",
            Error::AttributeAbsent { .. } => {
                "The window does not advertise this property. Pick a different window or --property."
            }

            Error::InvalidProcessId(_) => {
                "The property did not hold a usable process id. Inspect it with 'xprop _NET_WM_PID'."
            }
            Error::ProcessNotFound { .. } => {
                "The process exited, or it runs on another host than this one."
            }
            Error::PermissionDenied { .. } => {
                "Raising priority (negative values) needs root or CAP_SYS_NICE. Try a value of 0 or higher."
            }
            Error::PriorityFailed(_) => "Retry the command. Check the value is within -20..19.",

            Error::Config(_) => "Check syntax and schema_version in config.json.",

            Error::Io(_) => "Check file paths and permissions, then retry.",
            Error::Json(_) => {
                "Invalid JSON in file. Check syntax with 'jq . <file>' or restore from backup."
            }

            Error::UnsupportedPlatform(_) => {
                "This feature is not available on your platform. Use --snapshot for offline inspection."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidFormat(_)
            | Error::UnknownFormatChar(_)
            | Error::BadFormatApplication { .. } => "Format Error",
            Error::TypeSizeMismatch { .. } => "Type Mismatch",

            Error::Connection(_) => "Connection Error",
            Error::NoSuchWindow { .. } => "No Such Window",
            Error::PropertyFetchFailed(_) => "Property Fetch Failed",
            Error::AttributeAbsent { .. } => "Property Not Found",

            Error::InvalidProcessId(_) => "Invalid Process Id",
            Error::ProcessNotFound { .. } => "Process Not Found",
            Error::PermissionDenied { .. } => "Permission Denied",
            Error::PriorityFailed(_) => "Priority Change Failed",

            Error::Config(_) => "Configuration Error",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",

            Error::UnsupportedPlatform(_) => "Unsupported Platform",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is an expected, skippable outcome.
    pub recoverable: bool,

    /// Additional structured context (e.g., pid, window id).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ProcessNotFound { pid } | Error::PermissionDenied { pid } => {
                context.insert("pid".to_string(), serde_json::json!(pid));
            }
            Error::NoSuchWindow { window } => {
                context.insert("window".to_string(), serde_json::json!(window.to_string()));
            }
            Error::TypeSizeMismatch { declared, actual } => {
                context.insert("declared_size".to_string(), serde_json::json!(declared));
                context.insert("actual_size".to_string(), serde_json::json!(actual));
            }
            Error::AttributeAbsent { name, .. } => {
                context.insert("property".to_string(), serde_json::json!(name));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::InvalidFormat("12c".into()).code(), 10);
        assert_eq!(Error::UnknownFormatChar('z').code(), 11);
        assert_eq!(Error::ProcessNotFound { pid: 123 }.code(), 31);
        assert_eq!(Error::Config("bad".into()).code(), 40);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::BadFormatApplication {
                tag: 's',
                required: 8,
                size: 16
            }
            .category(),
            ErrorCategory::Format
        );
        assert_eq!(
            Error::NoSuchWindow {
                window: WindowId(0x1200007)
            }
            .category(),
            ErrorCategory::Window
        );
        assert_eq!(
            Error::PermissionDenied { pid: 1 }.category(),
            ErrorCategory::Priority
        );
    }

    #[test]
    fn test_recoverable_outcomes() {
        assert!(Error::TypeSizeMismatch {
            declared: 8,
            actual: 32
        }
        .is_recoverable());
        assert!(Error::AttributeAbsent {
            name: "_NET_WM_PID".into(),
            detail: "not found.".into()
        }
        .is_recoverable());
        assert!(!Error::InvalidFormat("3c".into()).is_recoverable());
        assert!(!Error::UnknownFormatChar('q').is_recoverable());
    }

    #[test]
    fn test_messages_match_tool_wording() {
        let err = Error::TypeSizeMismatch {
            declared: 8,
            actual: 32,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: assumed size 8 bits, actual size 32 bits"
        );

        let err = Error::NoSuchWindow {
            window: WindowId(0x400001),
        };
        assert_eq!(err.to_string(), "window id # 0x400001 does not exist");
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::ProcessNotFound { pid: 4321 };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 31);
        assert_eq!(structured.category, ErrorCategory::Priority);
        assert!(!structured.recoverable);
        assert_eq!(structured.context.get("pid"), Some(&serde_json::json!(4321)));

        let json = structured.to_json();
        assert!(json.contains("\"category\":\"priority\""));
    }

    #[test]
    fn test_format_error_human_plain() {
        let err = Error::UnknownFormatChar('q');
        let text = format_error_human(&err, false);
        assert!(text.starts_with("✗ Format Error"));
        assert!(text.contains("Reason: bad format character: q"));
        assert!(text.contains("Fix: "));
        assert!(!text.contains("\x1b["));
    }
}
