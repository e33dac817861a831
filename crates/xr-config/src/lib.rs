//! xrenice configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for config.json
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for diagnostics

pub mod config;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use config::{load_config, Config, LoadedConfig, MappingConfig};
pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Attribute holding the owning process id of a window.
pub const DEFAULT_PROPERTY: &str = "_NET_WM_PID";

/// Upper bound on fetched property bytes and rendered text.
pub const DEFAULT_MAX_LENGTH: usize = 500_000;

/// Highest scheduling priority (default when nothing else is configured).
pub const HIGHEST_PRIORITY: i32 = -20;

/// Lowest scheduling priority accepted in configuration.
pub const LOWEST_PRIORITY: i32 = 20;
