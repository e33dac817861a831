//! Atom, window and process identity types.
//!
//! Atoms and windows are 32-bit resource ids assigned by the window system
//! and stable for the lifetime of a connection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Window system atom: identifies both attribute names and value types.
///
/// The default is [`AtomId::NONE`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AtomId(pub u32);

impl AtomId {
    /// The `None` atom (no type / not interned).
    pub const NONE: AtomId = AtomId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AtomId {
    fn from(id: u32) -> Self {
        AtomId(id)
    }
}

/// Window handle, displayed in hex the way X tools print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for WindowId {
    type Err = String;

    /// Accepts `0x`-prefixed hex or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => s.parse::<u32>(),
        };
        parsed
            .map(WindowId)
            .map_err(|_| format!("invalid window id: {s}"))
    }
}

/// Process ID wrapper with display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Parse a rendered decimal field into a process id.
    ///
    /// Pid 0 is rejected: the priority syscalls treat it as "the caller".
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(pid) => Some(ProcessId(pid)),
        }
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        ProcessId(pid)
    }
}
