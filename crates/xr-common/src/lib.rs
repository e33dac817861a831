//! xrenice common types, IDs, and errors.
//!
//! This crate provides foundational types shared across xr-core modules:
//! - Atom, window and process identity types
//! - The unified error type with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{AtomId, ProcessId, WindowId};
pub use output::OutputFormat;
