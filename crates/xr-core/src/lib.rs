//! xrenice core library
//!
//! This library provides the property-to-priority machinery:
//! - Format specs and display formats for typed window properties
//! - The atom registry that maps properties and types to formats
//! - Decoding property bytes into fields and rendering them as text
//! - Window system backends (live X11, JSON snapshots)
//! - Scheduling priority control
//! - Exit codes, logging and the command report
//!
//! The binary entry point is in `main.rs`.

pub mod decode;
pub mod exit_codes;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod priority;
pub mod registry;
pub mod report;
pub mod window;

pub use decode::{decode, Field, FieldKind};
pub use format::{DisplayFormat, FormatSpec, FormatTag, Rendered, ValueFormatter};
pub use pipeline::{PropertyPipeline, RenderedProperty};
pub use priority::{PriorityAdapter, PriorityChange, PriorityConfig, PriorityControl};
pub use registry::{AtomRegistry, AtomResolver};
pub use window::{resolve_target, PropertyData, SnapshotSystem, TargetSelector, WindowSystem};
