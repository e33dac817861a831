//! Fuzz target for display format parsing.
//!
//! Parsing must never panic, and a parsed format must keep its source text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xr_core::format::DisplayFormat;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(dformat) = DisplayFormat::parse(text) {
        assert_eq!(dformat.as_str(), text);
    }
});
