//! Lenient coercion of raw request/embed input.
//!
//! Inputs arrive as untrusted text. Coercion never fails: malformed numbers
//! become `0`, which every caller treats as "no id".

use crate::model::term::TermId;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading int regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Integer prefix of `raw` after leading whitespace; `0` when there is none.
///
/// Values outside `i64` saturate at the nearest bound.
pub fn coerce_int(raw: &str) -> i64 {
    let Some(digits) = LEADING_INT_RE.captures(raw).and_then(|caps| caps.get(1)) else {
        return 0;
    };
    let text = digits.as_str();
    text.parse::<i64>().unwrap_or_else(|_| {
        if text.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Splits on commas and coerces every token.
///
/// Tokens that do not coerce stay in the list as `0`; an empty input yields
/// `[0]`.
pub fn parse_id_list(raw: &str) -> Vec<TermId> {
    raw.split(',').map(coerce_int).collect()
}

/// Strips markup and control characters and collapses whitespace.
pub fn sanitize_text_field(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, "");
    let without_controls = without_tags
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect::<String>();
    WHITESPACE_RE
        .replace_all(&without_controls, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{coerce_int, parse_id_list, sanitize_text_field};

    #[test]
    fn coerce_int_reads_leading_digits_only() {
        assert_eq!(coerce_int("42"), 42);
        assert_eq!(coerce_int("  17abc"), 17);
        assert_eq!(coerce_int("-3"), -3);
        assert_eq!(coerce_int("abc"), 0);
        assert_eq!(coerce_int(""), 0);
        assert_eq!(coerce_int("99999999999999999999"), i64::MAX);
    }

    #[test]
    fn parse_id_list_keeps_garbage_tokens_as_zero() {
        assert_eq!(parse_id_list("34,56"), vec![34, 56]);
        assert_eq!(parse_id_list("34, x ,56"), vec![34, 0, 56]);
        assert_eq!(parse_id_list(""), vec![0]);
    }

    #[test]
    fn sanitize_text_field_strips_tags_and_newlines() {
        assert_eq!(
            sanitize_text_field("  <b>cate</b>gory\n\tname "),
            "category name"
        );
    }
}
