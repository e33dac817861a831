//! Format specs: `<size><type-chars>`.
//!
//! The size is the property's bit width (0 accepts any width). Each type
//! character governs one decoded field; the last character repeats for
//! every field past the end of the string, so `"32c"` decodes any number of
//! cardinals and `"8s"` any number of strings.

use std::fmt;

use xr_common::{Error, Result};

/// Bit widths a format spec may declare.
pub const VALID_SIZES: [u8; 4] = [0, 8, 16, 32];

/// A field type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// `c`: unsigned decimal.
    Cardinal,
    /// `i`: signed decimal.
    Integer,
    /// `x`: unsigned hex.
    Hex,
    /// `b`: boolean.
    Boolean,
    /// `a`: atom, rendered by name.
    Atom,
    /// `s`: Latin-1 string.
    String,
    /// `u`: UTF-8 string.
    Utf8String,
    /// `t`: string carrying the property's declared type.
    TypedString,
    /// `o`: icon data, consumes the rest of the buffer.
    Icon,
}

impl FormatTag {
    pub fn from_char(c: char) -> Result<Self> {
        Ok(match c {
            'c' => FormatTag::Cardinal,
            'i' => FormatTag::Integer,
            'x' => FormatTag::Hex,
            'b' => FormatTag::Boolean,
            'a' => FormatTag::Atom,
            's' => FormatTag::String,
            'u' => FormatTag::Utf8String,
            't' => FormatTag::TypedString,
            'o' => FormatTag::Icon,
            other => return Err(Error::UnknownFormatChar(other)),
        })
    }

    pub fn as_char(self) -> char {
        match self {
            FormatTag::Cardinal => 'c',
            FormatTag::Integer => 'i',
            FormatTag::Hex => 'x',
            FormatTag::Boolean => 'b',
            FormatTag::Atom => 'a',
            FormatTag::String => 's',
            FormatTag::Utf8String => 'u',
            FormatTag::TypedString => 't',
            FormatTag::Icon => 'o',
        }
    }
}

/// Parse the leading size of a format spec and check it.
///
/// Fails with [`Error::InvalidFormat`] when the spec does not start with a
/// number, the number is not one of 0, 8, 16 or 32, or no type character
/// follows it.
pub fn validate_size(spec: &str) -> Result<u8> {
    let (size, rest) = split_size(spec)?;
    if rest.is_empty() {
        return Err(Error::InvalidFormat(spec.to_string()));
    }
    Ok(size)
}

/// Type character governing field `index` (last character repeats).
pub fn char_at(spec: &str, index: usize) -> Result<char> {
    let (_, rest) = split_size(spec)?;
    repeat_last(rest, index).ok_or_else(|| Error::InvalidFormat(spec.to_string()))
}

fn split_size(spec: &str) -> Result<(u8, &str)> {
    let digits = spec.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(Error::InvalidFormat(spec.to_string()));
    }
    let (number, rest) = spec.split_at(digits);
    let size = number
        .parse::<u64>()
        .ok()
        .and_then(|n| u8::try_from(n).ok())
        .filter(|n| VALID_SIZES.contains(n))
        .ok_or_else(|| Error::InvalidFormat(spec.to_string()))?;
    Ok((size, rest))
}

fn repeat_last(chars: &str, index: usize) -> Option<char> {
    chars.chars().nth(index).or_else(|| chars.chars().last())
}

/// A validated format spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    raw: String,
    size: u8,
    chars: Vec<char>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let size = validate_size(spec)?;
        let (_, rest) = split_size(spec)?;
        Ok(FormatSpec {
            raw: spec.to_string(),
            size,
            chars: rest.chars().collect(),
        })
    }

    /// Declared bit width; 0 means "accept the actual width".
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Type character for field `index`.
    pub fn char_at(&self, index: usize) -> char {
        let last = self.chars.len() - 1;
        self.chars[index.min(last)]
    }

    /// Type tag for field `index`, failing on characters outside the
    /// supported set.
    pub fn tag_at(&self, index: usize) -> Result<FormatTag> {
        FormatTag::from_char(self.char_at(index))
    }

    /// Check the declared size against a property's actual bit width.
    pub fn check_width(&self, actual: u8) -> Result<()> {
        if self.size != 0 && self.size != actual {
            return Err(Error::TypeSizeMismatch {
                declared: self.size,
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
