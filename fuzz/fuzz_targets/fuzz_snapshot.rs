//! Fuzz target for window snapshot loading.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xr_core::window::SnapshotSystem;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = SnapshotSystem::from_json(text);
});
