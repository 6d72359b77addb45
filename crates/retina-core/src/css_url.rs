#![forbid(unsafe_code)]

//! Inline `background-image` helpers.

use std::borrow::Cow;

/// Replace the first `url(...)` token in a style value with its body.
///
/// Matches `url(` case-insensitively, an optional `'` or `"`, a body of one
/// or more characters other than `)`, `'` and `"`, an optional closing quote,
/// then `)`. Text around the token is kept; a value with no token is
/// returned as-is, so `none` and `""` pass straight through.
///
/// ```
/// use retina_core::css_url::extract_css_url;
///
/// assert_eq!(extract_css_url("url(bg.png)"), "bg.png");
/// assert_eq!(extract_css_url("URL(\"bg.png\")"), "bg.png");
/// assert_eq!(extract_css_url("none"), "none");
/// ```
#[must_use]
pub fn extract_css_url(value: &str) -> Cow<'_, str> {
    let bytes = value.as_bytes();
    let mut from = 0;
    while let Some(offset) = find_url_open(&bytes[from..]) {
        let start = from + offset;
        if let Some((body, end)) = match_token(value, start + 4) {
            let mut out = String::with_capacity(value.len());
            out.push_str(&value[..start]);
            out.push_str(body);
            out.push_str(&value[end..]);
            return Cow::Owned(out);
        }
        from = start + 1;
    }
    Cow::Borrowed(value)
}

/// Wrap a URL for the `background-image` property.
#[must_use]
pub fn format_css_url(url: &str) -> String {
    format!("url({url})")
}

/// Offset of the next case-insensitive `url(`.
fn find_url_open(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(4)
        .position(|w| w[..3].eq_ignore_ascii_case(b"url") && w[3] == b'(')
}

/// Match the rest of a token starting right after `url(`.
///
/// Returns the body and the byte offset just past the closing `)`.
fn match_token(value: &str, open_end: usize) -> Option<(&str, usize)> {
    let bytes = value.as_bytes();
    let body_start = match bytes.get(open_end) {
        Some(b'\'' | b'"') => open_end + 1,
        _ => open_end,
    };
    let body_len = bytes[body_start..]
        .iter()
        .take_while(|&&b| !matches!(b, b')' | b'\'' | b'"'))
        .count();
    if body_len == 0 {
        return None;
    }
    let body_end = body_start + body_len;
    let close = match bytes.get(body_end) {
        Some(b'\'' | b'"') => body_end + 1,
        _ => body_end,
    };
    (bytes.get(close) == Some(&b')')).then(|| (&value[body_start..body_end], close + 1))
}
