//! Property decoding: raw bytes to typed fields.
//!
//! A property is a byte buffer tagged with a bit width of 8, 16 or 32.
//! Decoding walks the buffer with a cursor, asks the format spec which tag
//! governs the current field, and consumes one item (or one string, or the
//! whole remaining buffer for icons). Items are in native byte order, the
//! way the window system hands them to the client.

use serde::Serialize;

use crate::format::{FormatSpec, FormatTag};
use xr_common::{AtomId, Error, Result};

/// What a decoded field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Unsigned,
    Signed,
    RawString,
    /// A string tagged with the property's declared type.
    TypedString(AtomId),
    IconBlob,
}

/// One decoded value.
///
/// For numeric kinds `value` is the integer; for strings and icons it is
/// the number of bytes consumed and `bytes` holds the text or blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub index: usize,
    pub kind: FieldKind,
    pub value: i64,
    pub bytes: Option<&'a [u8]>,
}

/// Split `bytes` into fields according to `format`.
///
/// Stops once fewer than `bit_width / 8` bytes remain, so a truncated
/// trailing item never yields a field.
pub fn decode<'a>(
    bytes: &'a [u8],
    type_id: AtomId,
    format: &FormatSpec,
    bit_width: u8,
) -> Result<Vec<Field<'a>>> {
    let unit = item_size(bit_width)?;
    let mut fields = Vec::with_capacity(bytes.len() / unit);
    let mut rest = bytes;

    while rest.len() >= unit {
        let index = fields.len();
        let tag = format.tag_at(index)?;

        let (kind, value, span, consumed) = match tag {
            FormatTag::String | FormatTag::Utf8String => {
                require_width(tag, 8, bit_width)?;
                let (span, consumed) = extract_string(rest);
                (FieldKind::RawString, consumed as i64, Some(span), consumed)
            }
            FormatTag::TypedString => {
                require_width(tag, 8, bit_width)?;
                let (span, consumed) = extract_string(rest);
                (
                    FieldKind::TypedString(type_id),
                    consumed as i64,
                    Some(span),
                    consumed,
                )
            }
            FormatTag::Icon => {
                require_width(tag, 32, bit_width)?;
                (FieldKind::IconBlob, rest.len() as i64, Some(rest), rest.len())
            }
            FormatTag::Integer => (FieldKind::Signed, read_signed(rest, bit_width), None, unit),
            FormatTag::Cardinal | FormatTag::Hex | FormatTag::Boolean | FormatTag::Atom => {
                (FieldKind::Unsigned, read_unsigned(rest, bit_width), None, unit)
            }
        };

        fields.push(Field {
            index,
            kind,
            value,
            bytes: span,
        });
        rest = &rest[consumed..];
    }

    tracing::trace!(
        format = %format,
        bit_width,
        input_len = bytes.len(),
        fields = fields.len(),
        "decoded property"
    );

    Ok(fields)
}

fn item_size(bit_width: u8) -> Result<usize> {
    match bit_width {
        8 | 16 | 32 => Ok(usize::from(bit_width / 8)),
        other => Err(Error::InvalidFormat(format!(
            "unsupported property bit width {other}"
        ))),
    }
}

fn require_width(tag: FormatTag, required: u8, actual: u8) -> Result<()> {
    if actual != required {
        return Err(Error::BadFormatApplication {
            tag: tag.as_char(),
            required,
            size: actual,
        });
    }
    Ok(())
}

/// NUL-terminated (or buffer-terminated) string: returns the text without
/// the terminator and the number of bytes consumed including it.
fn extract_string(rest: &[u8]) -> (&[u8], usize) {
    match rest.iter().position(|&b| b == 0) {
        Some(nul) => (&rest[..nul], nul + 1),
        None => (rest, rest.len()),
    }
}

fn read_unsigned(rest: &[u8], bit_width: u8) -> i64 {
    match bit_width {
        8 => rest.first().map_or(0, |&b| i64::from(b)),
        16 => rest
            .first_chunk::<2>()
            .map_or(0, |c| i64::from(u16::from_ne_bytes(*c))),
        _ => rest
            .first_chunk::<4>()
            .map_or(0, |c| i64::from(u32::from_ne_bytes(*c))),
    }
}

fn read_signed(rest: &[u8], bit_width: u8) -> i64 {
    match bit_width {
        8 => rest.first().map_or(0, |&b| i64::from(b as i8)),
        16 => rest
            .first_chunk::<2>()
            .map_or(0, |c| i64::from(i16::from_ne_bytes(*c))),
        _ => rest
            .first_chunk::<4>()
            .map_or(0, |c| i64::from(i32::from_ne_bytes(*c))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(s: &str) -> FormatSpec {
        FormatSpec::parse(s).unwrap()
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn decodes_cardinals_at_each_width() {
        let fields = decode(&[1, 255], AtomId::NONE, &spec("8c"), 8).unwrap();
        assert_eq!(
            fields.iter().map(|f| f.value).collect::<Vec<_>>(),
            vec![1, 255]
        );

        let bytes: Vec<u8> = [7u16, 65535].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let fields = decode(&bytes, AtomId::NONE, &spec("16c"), 16).unwrap();
        assert_eq!(
            fields.iter().map(|f| f.value).collect::<Vec<_>>(),
            vec![7, 65535]
        );

        let bytes = u32s(&[4321, u32::MAX]);
        let fields = decode(&bytes, AtomId::NONE, &spec("32c"), 32).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].kind, FieldKind::Unsigned);
        assert_eq!(fields[0].value, 4321);
        assert_eq!(fields[1].value, i64::from(u32::MAX));
    }

    #[test]
    fn signed_values_sign_extend() {
        let bytes = (-5i32).to_ne_bytes();
        let fields = decode(&bytes, AtomId::NONE, &spec("32i"), 32).unwrap();
        assert_eq!(fields[0].kind, FieldKind::Signed);
        assert_eq!(fields[0].value, -5);

        let fields = decode(&[0xff], AtomId::NONE, &spec("8i"), 8).unwrap();
        assert_eq!(fields[0].value, -1);
    }

    #[test]
    fn stops_before_partial_trailing_item() {
        let mut bytes = u32s(&[1, 2]);
        bytes.extend_from_slice(&[9, 9, 9]);
        let fields = decode(&bytes, AtomId::NONE, &spec("0c"), 32).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].index, 1);
    }

    #[test]
    fn strings_split_on_nul() {
        let bytes = b"xterm\0XTerm\0tail";
        let fields = decode(bytes, AtomId(31), &spec("8s"), 8).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].bytes, Some(&b"xterm"[..]));
        assert_eq!(fields[0].value, 6);
        assert_eq!(fields[1].bytes, Some(&b"XTerm"[..]));
        assert_eq!(fields[2].bytes, Some(&b"tail"[..]));
        assert_eq!(fields[2].value, 4);
        assert!(fields.iter().all(|f| f.kind == FieldKind::RawString));
    }

    #[test]
    fn empty_string_consumes_terminator() {
        let fields = decode(b"\0a", AtomId::NONE, &spec("8s"), 8).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].bytes, Some(&b""[..]));
        assert_eq!(fields[0].value, 1);
    }

    #[test]
    fn typed_string_records_type() {
        let fields = decode(b"abc\0", AtomId(301), &spec("8t"), 8).unwrap();
        assert_eq!(fields[0].kind, FieldKind::TypedString(AtomId(301)));
    }

    #[test]
    fn string_tags_require_eight_bits() {
        let bytes = [0u8; 4];
        for s in ["8s", "8u", "8t"] {
            let err = decode(&bytes, AtomId::NONE, &spec(s), 16).unwrap_err();
            assert!(matches!(
                err,
                Error::BadFormatApplication {
                    required: 8,
                    size: 16,
                    ..
                }
            ));
        }
    }

    #[test]
    fn icon_consumes_everything() {
        let bytes = u32s(&[2, 2, 0xff00ff00, 0, 0, 0]);
        let fields = decode(&bytes, AtomId::NONE, &spec("32o"), 32).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].kind, FieldKind::IconBlob);
        assert_eq!(fields[0].value, 24);

        let fields = decode(&bytes, AtomId::NONE, &spec("32cco"), 32).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2].value, 16);

        assert!(matches!(
            decode(&[0u8; 8], AtomId::NONE, &spec("0o"), 8),
            Err(Error::BadFormatApplication { required: 32, .. })
        ));
    }

    #[test]
    fn unknown_tag_fails() {
        let err = decode(&[1, 2], AtomId::NONE, &spec("8cz"), 8).unwrap_err();
        assert!(matches!(err, Error::UnknownFormatChar('z')));
    }

    #[test]
    fn unsupported_width_fails() {
        assert!(matches!(
            decode(&[1, 2], AtomId::NONE, &spec("0c"), 0),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            decode(&[1, 2], AtomId::NONE, &spec("0c"), 12),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn empty_buffer_yields_no_fields() {
        let fields = decode(&[], AtomId::NONE, &spec("32c"), 32).unwrap();
        assert!(fields.is_empty());
    }
}
