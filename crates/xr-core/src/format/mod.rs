//! The two small languages of property rendering.
//!
//! - [`spec`]: `<size><type-chars>` format specs that drive decoding.
//! - [`display`]: display formats with `$N` / `$N+` field directives.
//! - [`value`]: rendering of a single decoded field by its type tag.

pub mod display;
pub mod spec;
pub mod value;

pub use display::{Directive, DisplayFormat, Rendered, FIELD_NOT_AVAILABLE, HEADER_LEN};
pub use spec::{FormatSpec, FormatTag};
pub use value::ValueFormatter;

/// Cut `text` to at most `max` bytes without splitting a character.
///
/// Returns true if anything was removed.
pub(crate) fn truncate_text(text: &mut String, max: usize) -> bool {
    if text.len() <= max {
        return false;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let mut s = "héllo".to_string();
        assert!(truncate_text(&mut s, 2));
        assert_eq!(s, "h");

        let mut s = "abc".to_string();
        assert!(!truncate_text(&mut s, 3));
        assert_eq!(s, "abc");

        let mut s = "abc".to_string();
        assert!(truncate_text(&mut s, 0));
        assert!(s.is_empty());
    }
}
