//! Rendering of one decoded field.

use std::fmt::Write as _;

use super::spec::FormatTag;
use super::truncate_text;
use crate::decode::{Field, FieldKind};
use crate::registry::{AtomRegistry, AtomResolver};
use xr_common::{AtomId, Result};

/// Renders fields as text, bounded to `max_length` bytes per field.
pub struct ValueFormatter<'a> {
    registry: &'a AtomRegistry,
    resolver: &'a dyn AtomResolver,
    max_length: usize,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(
        registry: &'a AtomRegistry,
        resolver: &'a dyn AtomResolver,
        max_length: usize,
    ) -> Self {
        Self {
            registry,
            resolver,
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Render `field` according to `tag`.
    ///
    /// Text output (strings, icons, atom names) is escaped and cut to the
    /// formatter's maximum length; numbers are never cut.
    pub fn render(&self, field: &Field<'_>, tag: FormatTag) -> Result<String> {
        let mut text = match tag {
            FormatTag::Cardinal => return Ok((field.value as u64).to_string()),
            FormatTag::Integer => return Ok(field.value.to_string()),
            FormatTag::Hex => return Ok(format!("{:#x}", field.value as u64)),
            FormatTag::Boolean => {
                let text = if field.value == 0 { "False" } else { "True" };
                return Ok(text.to_string());
            }
            FormatTag::Atom => self
                .registry
                .resolve_name(AtomId(field.value as u32), self.resolver),
            FormatTag::TypedString => {
                let type_id = match field.kind {
                    FieldKind::TypedString(type_id) => type_id,
                    _ => AtomId(field.value as u32),
                };
                self.registry.resolve_name(type_id, self.resolver)
            }
            FormatTag::String | FormatTag::Icon => {
                escape_latin1(field.bytes.unwrap_or_default(), self.max_length)
            }
            FormatTag::Utf8String => {
                let bytes = field.bytes.unwrap_or_default();
                escape_text(&String::from_utf8_lossy(bytes), self.max_length)
            }
        };

        if truncate_text(&mut text, self.max_length) {
            tracing::debug!(
                index = field.index,
                max_length = self.max_length,
                "field text truncated"
            );
        }
        Ok(text)
    }
}

/// Each byte is one character (ISO 8859-1).
fn escape_latin1(bytes: &[u8], max: usize) -> String {
    let mut out = String::with_capacity(bytes.len().min(max));
    for &b in bytes {
        if out.len() >= max {
            break;
        }
        push_escaped(&mut out, char::from(b));
    }
    out
}

fn escape_text(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len().min(max));
    for c in text.chars() {
        if out.len() >= max {
            break;
        }
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\\' => out.push_str("\\\\"),
        c if c.is_control() => {
            let _ = write!(out, "\\{:03o}", u32::from(c));
        }
        c => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NullResolver;

    fn num(value: i64, kind: FieldKind) -> Field<'static> {
        Field {
            index: 0,
            kind,
            value,
            bytes: None,
        }
    }

    fn text(bytes: &'static [u8]) -> Field<'static> {
        Field {
            index: 0,
            kind: FieldKind::RawString,
            value: bytes.len() as i64,
            bytes: Some(bytes),
        }
    }

    #[test]
    fn renders_numbers() {
        let registry = AtomRegistry::new();
        let fmt = ValueFormatter::new(&registry, &NullResolver, 100);

        let f = num(4321, FieldKind::Unsigned);
        assert_eq!(fmt.render(&f, FormatTag::Cardinal).unwrap(), "4321");
        assert_eq!(fmt.render(&f, FormatTag::Hex).unwrap(), "0x10e1");
        assert_eq!(fmt.render(&f, FormatTag::Boolean).unwrap(), "True");
        assert_eq!(
            fmt.render(&num(0, FieldKind::Unsigned), FormatTag::Boolean)
                .unwrap(),
            "False"
        );
        assert_eq!(
            fmt.render(&num(-5, FieldKind::Signed), FormatTag::Integer)
                .unwrap(),
            "-5"
        );
    }

    #[test]
    fn renders_atoms_by_name() {
        let mut registry = AtomRegistry::new();
        registry
            .register(AtomId(301), "_MY_TYPE", None, Some(" = $0\n"))
            .unwrap();
        let fmt = ValueFormatter::new(&registry, &NullResolver, 100);

        assert_eq!(
            fmt.render(&num(301, FieldKind::Unsigned), FormatTag::Atom)
                .unwrap(),
            "_MY_TYPE"
        );
        assert_eq!(
            fmt.render(&num(0x99, FieldKind::Unsigned), FormatTag::Atom)
                .unwrap(),
            "undefined atom # 0x99"
        );

        let typed = Field {
            index: 0,
            kind: FieldKind::TypedString(AtomId(301)),
            value: 4,
            bytes: Some(b"abc"),
        };
        assert_eq!(
            fmt.render(&typed, FormatTag::TypedString).unwrap(),
            "_MY_TYPE"
        );
    }

    #[test]
    fn escapes_strings() {
        let registry = AtomRegistry::new();
        let fmt = ValueFormatter::new(&registry, &NullResolver, 100);

        assert_eq!(
            fmt.render(&text(b"a\tb\nc\\d\x01"), FormatTag::String)
                .unwrap(),
            "a\\tb\\nc\\\\d\\001"
        );
        assert_eq!(fmt.render(&text(b"caf\xe9"), FormatTag::String).unwrap(), "café");
        assert_eq!(
            fmt.render(&text("café".as_bytes()), FormatTag::Utf8String)
                .unwrap(),
            "café"
        );
    }

    #[test]
    fn truncates_long_text() {
        let registry = AtomRegistry::new();
        let fmt = ValueFormatter::new(&registry, &NullResolver, 4);

        assert_eq!(
            fmt.render(&text(b"abcdefgh"), FormatTag::String).unwrap(),
            "abcd"
        );
        // "é" is two bytes; cutting at 4 would split the second one.
        assert_eq!(
            fmt.render(&text("aéé".as_bytes()), FormatTag::Utf8String)
                .unwrap(),
            "aé"
        );
        let fmt = ValueFormatter::new(&registry, &NullResolver, 2);
        assert_eq!(
            fmt.render(&num(4321, FieldKind::Unsigned), FormatTag::Cardinal)
                .unwrap(),
            "4321"
        );
    }
}
