//! Exit codes for the xrenice CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-1: Success and usage errors
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

use xr_common::Error;

/// Exit codes for xrenice.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success, including recoverable outcomes that skipped the change
    /// (property absent, type size mismatch).
    Clean = 0,

    /// Invalid arguments
    ArgsError = 1,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Cannot connect, or the window does not exist
    WindowError = 10,

    /// Property could not be fetched or did not hold a process id
    PropertyError = 11,

    /// Bad format spec or display format
    FormatError = 12,

    /// Not allowed to change the priority
    PermissionError = 13,

    /// Configuration or snapshot file invalid
    ConfigError = 14,

    /// Process gone or priority syscall failed
    PriorityError = 15,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a failed command.
    ///
    /// Recoverable errors map to [`ExitCode::Clean`]: they are reported but
    /// are not failures.
    pub fn for_error(err: &Error) -> Self {
        if err.is_recoverable() {
            return ExitCode::Clean;
        }
        match err {
            Error::InvalidFormat(_)
            | Error::UnknownFormatChar(_)
            | Error::BadFormatApplication { .. }
            | Error::TypeSizeMismatch { .. } => ExitCode::FormatError,

            Error::Connection(_) | Error::NoSuchWindow { .. } => ExitCode::WindowError,

            Error::PropertyFetchFailed(_)
            | Error::AttributeAbsent { .. }
            | Error::InvalidProcessId(_) => ExitCode::PropertyError,

            Error::PermissionDenied { .. } => ExitCode::PermissionError,
            Error::ProcessNotFound { .. } | Error::PriorityFailed(_) => ExitCode::PriorityError,

            Error::Config(_) => ExitCode::ConfigError,
            Error::Io(_) | Error::Json(_) => ExitCode::IoError,
            Error::UnsupportedPlatform(_) => ExitCode::InternalError,
        }
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::WindowError => "ERR_WINDOW",
            ExitCode::PropertyError => "ERR_PROPERTY",
            ExitCode::FormatError => "ERR_FORMAT",
            ExitCode::PermissionError => "ERR_PERMISSION",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::PriorityError => "ERR_PRIORITY",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
