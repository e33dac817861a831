//! Fuzz target for config.json parsing.
//!
//! Tests that configuration parsing handles arbitrary input without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xr_config::Config;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Should never panic, only return an error
    let _ = Config::parse_json(text);
});
