//! Structured logging for xrenice.
//!
//! Two output modes:
//! - Human-readable console output for interactive use
//! - JSON lines for scripts that collect diagnostics
//!
//! stdout is reserved for the command payload; every log line goes to
//! stderr.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive for our own crates at `level`.
fn default_directives(level: LogLevel) -> String {
    format!("xr_core={level},xrenice={level}")
}

/// Initialize the logging subsystem.
///
/// Call once at startup. A config level chosen on the command line wins;
/// otherwise `RUST_LOG`, when it holds a full filter, is used verbatim.
pub fn init_logging(config: &LogConfig, cli_override: bool) {
    let filter = if cli_override {
        EnvFilter::new(default_directives(config.level))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(config.level)))
    };

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            // A subscriber that is already installed (tests) keeps precedence.
            let _ = if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            };
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(false);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init();
        }
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    // First 12 hex chars of the simple form.
    format!("run-{}", &uuid.simple().to_string()[..12])
}
