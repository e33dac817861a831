//! Fuzz target for property decoding and rendering.
//!
//! Arbitrary bytes, widths and format strings must produce either fields
//! and text or a typed error, never a panic, and rendered text must stay
//! within the length bound.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xr_common::AtomId;
use xr_core::decode;
use xr_core::format::{DisplayFormat, FormatSpec, ValueFormatter};
use xr_core::registry::{AtomRegistry, NullResolver};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    format: &'a str,
    dformat: &'a str,
    width: u8,
    type_id: u32,
    max_length: u16,
    bytes: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let Ok(spec) = FormatSpec::parse(input.format) else {
        return;
    };
    let Ok(fields) = decode(input.bytes, AtomId(input.type_id), &spec, input.width) else {
        return;
    };
    let Ok(dformat) = DisplayFormat::parse(input.dformat) else {
        return;
    };

    let registry = AtomRegistry::with_builtins(&NullResolver).unwrap();
    let max_length = usize::from(input.max_length).max(1);
    let formatter = ValueFormatter::new(&registry, &NullResolver, max_length);
    if let Ok(rendered) = dformat.render(&fields, &spec, &formatter) {
        assert!(rendered.text.len() <= max_length);
    }
});
