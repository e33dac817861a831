//! Process scheduling priority (nice value) adjustment.
//!
//! Reads and sets priorities with getpriority(2)/setpriority(2). The
//! adapter reports the value before and after a change, read back from the
//! kernel rather than assumed.

use serde::Serialize;

use xr_common::{Error, ProcessId, Result};

/// Highest priority (most favourable scheduling).
pub const MIN_NICE_VALUE: i32 = -20;

/// Lowest priority the kernel accepts.
pub const MAX_NICE_VALUE: i32 = 19;

/// OS priority accessors.
pub trait PriorityControl {
    fn get_priority(&self, pid: ProcessId) -> Result<i32>;
    fn set_priority(&self, pid: ProcessId, value: i32) -> Result<()>;
}

/// The running system's scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPriority;

#[cfg(unix)]
impl PriorityControl for SystemPriority {
    fn get_priority(&self, pid: ProcessId) -> Result<i32> {
        // -1 is a valid nice value, so errno is the only failure signal.
        clear_errno();
        let value = unsafe { libc::getpriority(libc::PRIO_PROCESS, pid.0 as libc::id_t) };
        if value == -1 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error().is_some_and(|code| code != 0) {
                return Err(os_error(pid, err));
            }
        }
        Ok(value)
    }

    fn set_priority(&self, pid: ProcessId, value: i32) -> Result<()> {
        let result = unsafe { libc::setpriority(libc::PRIO_PROCESS, pid.0 as libc::id_t, value) };
        if result == 0 {
            return Ok(());
        }
        Err(os_error(pid, std::io::Error::last_os_error()))
    }
}

#[cfg(not(unix))]
impl PriorityControl for SystemPriority {
    fn get_priority(&self, _pid: ProcessId) -> Result<i32> {
        Err(Error::UnsupportedPlatform(
            "process priorities need a unix system".to_string(),
        ))
    }

    fn set_priority(&self, _pid: ProcessId, _value: i32) -> Result<()> {
        Err(Error::UnsupportedPlatform(
            "process priorities need a unix system".to_string(),
        ))
    }
}

#[cfg(unix)]
fn os_error(pid: ProcessId, err: std::io::Error) -> Error {
    match err.raw_os_error() {
        Some(libc::ESRCH) => Error::ProcessNotFound { pid: pid.0 },
        Some(libc::EPERM) | Some(libc::EACCES) => Error::PermissionDenied { pid: pid.0 },
        _ => Error::PriorityFailed(err.to_string()),
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn clear_errno() {
    #[cfg(target_os = "linux")]
    unsafe {
        *libc::__errno_location() = 0;
    }
    #[cfg(target_os = "android")]
    unsafe {
        *libc::__errno() = 0;
    }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn clear_errno() {
    unsafe {
        *libc::__error() = 0;
    }
}

#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd"
    ))
))]
fn clear_errno() {}

/// Priority adapter configuration.
#[derive(Debug, Clone)]
pub struct PriorityConfig {
    /// Nice value to apply.
    pub priority: i32,
    /// Clamp into the kernel's range instead of passing the value through.
    pub clamp_to_range: bool,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            priority: MIN_NICE_VALUE,
            clamp_to_range: true,
        }
    }
}

/// Outcome of a priority change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityChange {
    pub pid: ProcessId,
    pub requested: i32,
    pub before: i32,
    pub after: i32,
}

#[derive(Debug)]
pub struct PriorityAdapter<C: PriorityControl = SystemPriority> {
    control: C,
    config: PriorityConfig,
}

impl PriorityAdapter<SystemPriority> {
    pub fn system(config: PriorityConfig) -> Self {
        Self::new(SystemPriority, config)
    }
}

impl<C: PriorityControl> PriorityAdapter<C> {
    pub fn new(control: C, config: PriorityConfig) -> Self {
        Self { control, config }
    }

    /// The value `apply` will request, clamped if configured.
    pub fn effective_priority(&self) -> i32 {
        if self.config.clamp_to_range {
            self.config.priority.clamp(MIN_NICE_VALUE, MAX_NICE_VALUE)
        } else {
            self.config.priority
        }
    }

    pub fn read(&self, pid: ProcessId) -> Result<i32> {
        self.control.get_priority(pid)
    }

    /// Set the configured priority on `pid` and report before/after.
    pub fn apply(&self, pid: ProcessId) -> Result<PriorityChange> {
        let requested = self.effective_priority();
        let before = self.control.get_priority(pid)?;
        self.control.set_priority(pid, requested)?;
        let after = self.control.get_priority(pid)?;

        tracing::info!(pid = pid.0, before, after, requested, "changed process priority");
        if after != requested {
            tracing::warn!(
                pid = pid.0,
                requested,
                after,
                "kernel applied a different priority than requested"
            );
        }

        Ok(PriorityChange {
            pid,
            requested,
            before,
            after,
        })
    }
}
