#![forbid(unsafe_code)]

//! `data-rjs` directives and density cap selection.
//!
//! A directive is either a number (the highest density the author prepared
//! assets for) or anything else, which is taken verbatim as the URL of the
//! high-resolution asset. Numbers use leading-integer parsing, so `"2"`,
//! `" 2"` and `"2x"` are all the cap 2, while `"hi.png"` is a URL.

use crate::density::Density;

/// A parsed `data-rjs` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Assets exist up to this density (`photo@2x.png`, `photo@3x.png`, ...).
    Cap(i64),
    /// Explicit high-resolution URL.
    Url(String),
}

impl Directive {
    /// Classify a raw attribute value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match parse_leading_int(raw) {
            Some(cap) => Self::Cap(cap),
            None => Self::Url(raw.to_owned()),
        }
    }
}

/// Parse a leading base-10 integer.
///
/// Skips leading whitespace (including a byte-order mark), accepts one optional `+`/`-`, then consumes
/// digits until the first non-digit. Returns `None` when no digit follows,
/// which plays the role of "not a number". Overlong inputs saturate.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    seen.then_some(if negative { -value } else { value })
}

/// Pick the density to fetch: never more than the environment needs, never
/// more than the author prepared.
#[inline]
#[must_use]
pub fn choose_cap(density: Density, requested: i64) -> i64 {
    i64::from(density.get()).min(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn density(n: u32) -> Density {
        Density::new(n).unwrap()
    }

    #[test]
    fn leading_int_accepts_prefixes() {
        assert_eq!(parse_leading_int("2"), Some(2));
        assert_eq!(parse_leading_int("  3"), Some(3));
        assert_eq!(parse_leading_int("2x"), Some(2));
        assert_eq!(parse_leading_int("+4"), Some(4));
        assert_eq!(parse_leading_int("-1"), Some(-1));
        assert_eq!(parse_leading_int("007"), Some(7));
    }

    #[test]
    fn leading_int_rejects_non_numbers() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("x2"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("/images/hi.png"), None);
        assert_eq!(parse_leading_int("https://example.com/hi.png"), None);
    }

    #[test]
    fn leading_int_saturates() {
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn directive_classification() {
        assert_eq!(Directive::parse("3"), Directive::Cap(3));
        assert_eq!(
            Directive::parse("/img/hero-hd.jpg"),
            Directive::Url("/img/hero-hd.jpg".into())
        );
        // A URL that happens to start with digits is still a number.
        assert_eq!(Directive::parse("2x.png"), Directive::Cap(2));
    }

    #[test]
    fn cap_is_the_smaller_of_env_and_author() {
        assert_eq!(choose_cap(density(1), 3), 1);
        assert_eq!(choose_cap(density(2), 3), 2);
        assert_eq!(choose_cap(density(3), 2), 2);
        assert_eq!(choose_cap(density(3), 3), 3);
        assert_eq!(choose_cap(density(2), -1), -1);
    }

    #[test]
    fn leading_int_skips_byte_order_mark() {
        assert_eq!(parse_leading_int("\u{FEFF}2"), Some(2));
        assert_eq!(parse_leading_int(" \u{FEFF} 3"), Some(3));
        assert_eq!(Directive::parse("\u{FEFF}2"), Directive::Cap(2));
    }
}
