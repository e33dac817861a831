//! Command result reporting.
//!
//! One [`Report`] per invocation, rendered either as the classic text lines
//! (`PROCESS PID:` / `PRIORITY BEFORE:` / `PRIORITY AFTER:`) or as a JSON
//! object.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::RenderedProperty;
use crate::priority::PriorityChange;
use xr_common::{Error, ProcessId, StructuredError, WindowId};

/// Version of the JSON report layout.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    /// An expected outcome prevented the change (property absent, size
    /// mismatch).
    Skipped,
    Error,
}

/// Priority part of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PriorityOutcome {
    Set {
        requested: i32,
        before: i32,
        after: i32,
    },
    Get {
        priority: i32,
    },
}

impl From<PriorityChange> for PriorityOutcome {
    fn from(change: PriorityChange) -> Self {
        PriorityOutcome::Set {
            requested: change.requested,
            before: change.before,
            after: change.after,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: &'static str,
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<RenderedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<ProcessId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityOutcome>,
    /// Short id of the configuration in effect.
    pub config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StructuredError>,
}

impl Report {
    pub fn new(run_id: impl Into<String>, config: impl Into<String>) -> Self {
        Report {
            schema_version: REPORT_SCHEMA_VERSION,
            run_id: run_id.into(),
            generated_at: Utc::now(),
            status: Status::Ok,
            window: None,
            property: None,
            pid: None,
            priority: None,
            config: config.into(),
            error: None,
        }
    }

    /// Record a failure. Recoverable errors mark the run skipped.
    pub fn fail(&mut self, err: &Error) {
        self.status = if err.is_recoverable() {
            Status::Skipped
        } else {
            Status::Error
        };
        self.error = Some(StructuredError::from(err));
    }

    /// Text lines for stdout.
    ///
    /// `verbose` adds the rendered property line before the pid. Hard
    /// errors produce no stdout text; they are reported on stderr.
    pub fn render_text(&self, verbose: bool) -> String {
        let mut out = String::new();

        if verbose {
            if let Some(prop) = &self.property {
                out.push_str(&prop.line());
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }

        if self.status == Status::Skipped {
            if let Some(err) = &self.error {
                out.push_str(&err.message);
                out.push('\n');
            }
            return out;
        }

        if let Some(pid) = self.pid {
            out.push_str(&format!("PROCESS PID: {pid}\n"));
        }
        match self.priority {
            Some(PriorityOutcome::Set { before, after, .. }) => {
                out.push_str(&format!("PRIORITY BEFORE: {before}\n"));
                out.push_str(&format!("PRIORITY AFTER: {after}\n"));
            }
            Some(PriorityOutcome::Get { priority }) => {
                out.push_str(&format!("PRIORITY: {priority}\n"));
            }
            None => {}
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
