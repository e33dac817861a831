//! Property-based tests for decoding and display-format rendering.

use proptest::prelude::*;
use xr_common::{AtomId, Error};
use xr_core::format::{DisplayFormat, FormatSpec, ValueFormatter, FIELD_NOT_AVAILABLE};
use xr_core::registry::{AtomRegistry, NullResolver};
use xr_core::{decode, FieldKind};

fn width_strategy() -> impl Strategy<Value = u8> {
    prop_oneof![Just(8u8), Just(16u8), Just(32u8)]
}

/// Encode `values` at `width` bits, native byte order.
fn encode(values: &[u32], width: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    for &v in values {
        match width {
            8 => bytes.push(v as u8),
            16 => bytes.extend_from_slice(&(v as u16).to_ne_bytes()),
            _ => bytes.extend_from_slice(&v.to_ne_bytes()),
        }
    }
    bytes
}

fn mask(v: u32, width: u8) -> u32 {
    match width {
        8 => v & 0xff,
        16 => v & 0xffff,
        _ => v,
    }
}

fn sign_extend(v: u32, width: u8) -> i64 {
    match width {
        8 => (v as u8 as i8) as i64,
        16 => (v as u16 as i16) as i64,
        _ => (v as i32) as i64,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn unsigned_field_count_and_values(
        width in width_strategy(),
        values in prop::collection::vec(any::<u32>(), 0..64),
    ) {
        let bytes = encode(&values, width);
        let spec = FormatSpec::parse("0c").unwrap();
        let fields = decode(&bytes, AtomId(6), &spec, width).unwrap();

        prop_assert_eq!(fields.len(), bytes.len() * 8 / width as usize);
        for (field, &v) in fields.iter().zip(&values) {
            prop_assert_eq!(field.kind, FieldKind::Unsigned);
            prop_assert_eq!(field.value, mask(v, width) as i64);
        }
    }

    #[test]
    fn signed_field_count_and_values(
        width in width_strategy(),
        values in prop::collection::vec(any::<u32>(), 0..64),
    ) {
        let bytes = encode(&values, width);
        let spec = FormatSpec::parse("0i").unwrap();
        let fields = decode(&bytes, AtomId(19), &spec, width).unwrap();

        prop_assert_eq!(fields.len(), values.len());
        for (field, &v) in fields.iter().zip(&values) {
            prop_assert_eq!(field.kind, FieldKind::Signed);
            prop_assert_eq!(field.value, sign_extend(v, width));
        }
    }

    #[test]
    fn decode_is_deterministic(
        width in width_strategy(),
        bytes in prop::collection::vec(any::<u8>(), 0..256),
        format in prop_oneof![Just("0c"), Just("0i"), Just("0x"), Just("0cix"), Just("0b")],
    ) {
        let spec = FormatSpec::parse(format).unwrap();
        let first = decode(&bytes, AtomId::NONE, &spec, width).unwrap();
        let second = decode(&bytes, AtomId::NONE, &spec, width).unwrap();

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(a.kind, b.kind);
            prop_assert_eq!(a.value, b.value);
        }
    }

    #[test]
    fn trailing_partial_item_is_ignored(
        values in prop::collection::vec(any::<u32>(), 0..16),
        extra in 1usize..4,
    ) {
        let mut bytes = encode(&values, 32);
        bytes.extend(std::iter::repeat(0xaa).take(extra));
        let spec = FormatSpec::parse("32c").unwrap();
        let fields = decode(&bytes, AtomId(6), &spec, 32).unwrap();
        prop_assert_eq!(fields.len(), values.len());
    }

    #[test]
    fn out_of_range_reference_renders_sentinel(
        values in prop::collection::vec(any::<u32>(), 0..8),
        offset in 0usize..1_000_000,
    ) {
        let bytes = encode(&values, 32);
        let spec = FormatSpec::parse("32c").unwrap();
        let fields = decode(&bytes, AtomId(6), &spec, 32).unwrap();
        let index = fields.len() + offset;

        let dformat = DisplayFormat::parse(&format!(" = ${index}")).unwrap();
        let registry = AtomRegistry::new();
        let formatter = ValueFormatter::new(&registry, &NullResolver, 10_000);
        let rendered = dformat.render(&fields, &spec, &formatter).unwrap();
        prop_assert_eq!(rendered.text, FIELD_NOT_AVAILABLE);
    }

    #[test]
    fn cardinal_renders_parse_back(value in any::<u32>()) {
        let bytes = value.to_ne_bytes();
        let spec = FormatSpec::parse("32c").unwrap();
        let fields = decode(&bytes, AtomId(6), &spec, 32).unwrap();

        let dformat = DisplayFormat::parse(" = $0+\n").unwrap();
        let registry = AtomRegistry::new();
        let formatter = ValueFormatter::new(&registry, &NullResolver, 1000);
        let rendered = dformat.render(&fields, &spec, &formatter).unwrap();

        prop_assert_eq!(rendered.text.trim_end().parse::<u32>().unwrap(), value);
    }

    #[test]
    fn aggregate_joins_every_field(values in prop::collection::vec(0u32..100_000, 1..20)) {
        let bytes = encode(&values, 32);
        let spec = FormatSpec::parse("32c").unwrap();
        let fields = decode(&bytes, AtomId(6), &spec, 32).unwrap();

        let dformat = DisplayFormat::parse(" = $0+").unwrap();
        let registry = AtomRegistry::new();
        let formatter = ValueFormatter::new(&registry, &NullResolver, 1_000_000);
        let rendered = dformat.render(&fields, &spec, &formatter).unwrap();

        let expected = values
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        prop_assert_eq!(rendered.first_value(), Some(expected.as_str()));
        prop_assert_eq!(rendered.text, expected);
    }

    #[test]
    fn rendered_text_respects_bound(
        text in "[a-z]{0,200}",
        max_length in 1usize..64,
    ) {
        let mut bytes = text.into_bytes();
        bytes.push(0);
        let spec = FormatSpec::parse("8s").unwrap();
        let fields = decode(&bytes, AtomId(31), &spec, 8).unwrap();

        let dformat = DisplayFormat::parse(" = $0+\n").unwrap();
        let registry = AtomRegistry::new();
        let formatter = ValueFormatter::new(&registry, &NullResolver, max_length);
        let rendered = dformat.render(&fields, &spec, &formatter).unwrap();
        prop_assert!(rendered.text.len() <= max_length);
    }

    #[test]
    fn aggregate_value_respects_bound(
        count in 1usize..2000,
        max_length in 1usize..64,
    ) {
        let bytes = vec![255u8; count];
        let spec = FormatSpec::parse("8c").unwrap();
        let fields = decode(&bytes, AtomId(6), &spec, 8).unwrap();

        let dformat = DisplayFormat::parse(" = $0+\n").unwrap();
        let registry = AtomRegistry::new();
        let formatter = ValueFormatter::new(&registry, &NullResolver, max_length);
        let rendered = dformat.render(&fields, &spec, &formatter).unwrap();

        prop_assert!(rendered.text.len() <= max_length);
        for value in &rendered.values {
            prop_assert!(value.len() <= max_length);
        }
    }
}

#[test]
fn worked_examples() {
    let registry = AtomRegistry::new();
    let formatter = ValueFormatter::new(&registry, &NullResolver, 1000);

    let spec = FormatSpec::parse("32c").unwrap();
    let bytes = 4321u32.to_ne_bytes();
    let fields = decode(&bytes, AtomId(6), &spec, 32).unwrap();
    let rendered = DisplayFormat::parse(" = $0+\n")
        .unwrap()
        .render(&fields, &spec, &formatter)
        .unwrap();
    assert_eq!(rendered.text, "4321\n");

    let spec = FormatSpec::parse("32i").unwrap();
    let bytes = (-5i32).to_ne_bytes();
    let fields = decode(&bytes, AtomId(19), &spec, 32).unwrap();
    let rendered = DisplayFormat::parse(" = $0")
        .unwrap()
        .render(&fields, &spec, &formatter)
        .unwrap();
    assert_eq!(rendered.text, "-5");
}

#[test]
fn validation_failures() {
    assert!(matches!(
        FormatSpec::parse("12c"),
        Err(Error::InvalidFormat(_))
    ));

    let spec = FormatSpec::parse("8s").unwrap();
    assert!(matches!(
        decode(&[b'a', 0, b'b', 0], AtomId(31), &spec, 16),
        Err(Error::BadFormatApplication { .. })
    ));
}

#[test]
fn registry_shadowing() {
    let mut registry = AtomRegistry::new();
    registry.register(AtomId(7), "A", Some("8c"), Some(" = $0")).unwrap();
    registry.register(AtomId(7), "B", Some("16x"), None).unwrap();

    let (format, dformat) = registry.lookup(AtomId(7));
    assert_eq!(format.map(FormatSpec::as_str), Some("16x"));
    assert!(dformat.is_none());
}
