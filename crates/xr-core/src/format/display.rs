//! Display formats: how decoded fields become text.
//!
//! A display format starts with a three character header that is kept but
//! never interpreted (` = ` in the default format, which lets the CLI print
//! `NAME = value`). The rest is literal text plus directives:
//!
//! - `$N` renders field N, or [`FIELD_NOT_AVAILABLE`] when there is no
//!   such field.
//! - `$N+` renders fields N through the last one joined with `", "`.
//!
//! Formats are parsed once into a [`Directive`] list and then applied to
//! any number of field sequences.

use std::fmt;

use serde::Serialize;

use super::spec::FormatSpec;
use super::truncate_text;
use super::value::ValueFormatter;
use crate::decode::Field;
use xr_common::{Error, Result};

/// Number of leading characters that are carried but not interpreted.
pub const HEADER_LEN: usize = 3;

/// Rendered in place of a `$N` directive that names a missing field.
pub const FIELD_NOT_AVAILABLE: &str = "field not available";

const AGGREGATE_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Literal(String),
    FieldRef { index: usize, aggregate: bool },
}

/// A parsed display format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    raw: String,
    header: String,
    directives: Vec<Directive>,
}

/// Output of one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rendered {
    /// Full rendered text, header excluded.
    pub text: String,
    /// Value of each field directive, in order. An aggregate directive's
    /// value is its whole comma-joined text.
    pub values: Vec<String>,
    /// Whether the text hit the length bound.
    pub truncated: bool,
}

impl Rendered {
    /// Value of the first field directive, used to pull a single number
    /// (such as a process id) out of a property.
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

impl DisplayFormat {
    /// Parse a display format.
    ///
    /// Formats shorter than the header are accepted and render as empty.
    /// A `$` not followed by a decimal index is [`Error::InvalidFormat`].
    pub fn parse(dformat: &str) -> Result<Self> {
        let split = dformat
            .char_indices()
            .nth(HEADER_LEN)
            .map_or(dformat.len(), |(pos, _)| pos);
        let (header, body) = dformat.split_at(split);

        let mut directives = Vec::new();
        let mut literal = String::new();
        let mut chars = body.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            if digits.is_empty() {
                return Err(Error::InvalidFormat(format!(
                    "bad number after '$' in display format {dformat:?}"
                )));
            }
            // Indices beyond usize can never name a field; saturate so they
            // render as unavailable.
            let index = digits.parse::<usize>().unwrap_or(usize::MAX);
            let aggregate = chars.next_if_eq(&'+').is_some();

            if !literal.is_empty() {
                directives.push(Directive::Literal(std::mem::take(&mut literal)));
            }
            directives.push(Directive::FieldRef { index, aggregate });
        }
        if !literal.is_empty() {
            directives.push(Directive::Literal(literal));
        }

        Ok(DisplayFormat {
            raw: dformat.to_string(),
            header: header.to_string(),
            directives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The uninterpreted leading characters.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Render `fields`, taking each field's type tag from `format`.
    ///
    /// Total output and every recorded value are bounded by the
    /// formatter's maximum length.
    pub fn render(
        &self,
        fields: &[Field<'_>],
        format: &FormatSpec,
        formatter: &ValueFormatter<'_>,
    ) -> Result<Rendered> {
        let budget = formatter.max_length();
        let mut out = Rendered::default();

        for directive in &self.directives {
            match directive {
                Directive::Literal(text) => out.text.push_str(text),
                Directive::FieldRef { index, aggregate } => {
                    let mut value = if *aggregate {
                        let mut joined = String::new();
                        for i in *index..fields.len() {
                            if i > *index {
                                joined.push_str(AGGREGATE_SEPARATOR);
                            }
                            joined.push_str(&render_field(fields, format, formatter, i)?);
                            if out.text.len() + joined.len() > budget {
                                break;
                            }
                        }
                        joined
                    } else {
                        render_field(fields, format, formatter, *index)?
                    };
                    out.truncated |= truncate_text(&mut value, budget);
                    out.text.push_str(&value);
                    out.values.push(value);
                }
            }

            if out.text.len() > budget {
                break;
            }
        }

        out.truncated |= truncate_text(&mut out.text, budget);
        if out.truncated {
            tracing::debug!(max_length = budget, "rendered text truncated");
        }
        Ok(out)
    }
}

fn render_field(
    fields: &[Field<'_>],
    format: &FormatSpec,
    formatter: &ValueFormatter<'_>,
    index: usize,
) -> Result<String> {
    match fields.get(index) {
        Some(field) => formatter.render(field, format.tag_at(index)?),
        None => Ok(FIELD_NOT_AVAILABLE.to_string()),
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
