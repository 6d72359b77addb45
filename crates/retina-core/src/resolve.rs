#![forbid(unsafe_code)]

//! `@Nx` URL resolution.
//!
//! The high-resolution variant of `photo.png` lives at `photo@2x.png`. The
//! suffix is inserted before the trailing extension segment:
//!
//! ```text
//! . <3-4 chars in A..=z> [ / ] [ ? <query without line breaks> ] <end>
//! ```
//!
//! The leftmost segment that reaches the end of the string wins. URLs with no
//! such segment (`/image`, `photo.webp2`) come back untouched; they are still
//! probed as-is by the dispatcher.

use std::borrow::Cow;

/// Derive the high-resolution URL for `src` at density `cap`.
///
/// Returns `None` when no swap is needed: `cap <= 1` or an empty source.
///
/// # Example
///
/// ```
/// use retina_core::resolve_url;
///
/// assert_eq!(resolve_url("photo.png", 2).as_deref(), Some("photo@2x.png"));
/// assert_eq!(resolve_url("photo.png?v=3", 2).as_deref(), Some("photo@2x.png?v=3"));
/// assert_eq!(resolve_url("photo.png", 1), None);
/// ```
#[must_use]
pub fn resolve_url(src: &str, cap: i64) -> Option<String> {
    if cap <= 1 || src.is_empty() {
        return None;
    }
    let resolved = insert_density_suffix(src, cap).into_owned();
    #[cfg(feature = "tracing")]
    tracing::trace!(src, cap, resolved = %resolved, "resolved high-density url");
    Some(resolved)
}

/// Insert `@{cap}x` before the extension segment of `src`.
///
/// Borrows `src` unchanged when no extension segment matches.
#[must_use]
pub fn insert_density_suffix(src: &str, cap: i64) -> Cow<'_, str> {
    match extension_start(src) {
        Some(at) => {
            let mut out = String::with_capacity(src.len() + 4);
            out.push_str(&src[..at]);
            out.push('@');
            out.push_str(&cap.to_string());
            out.push('x');
            out.push_str(&src[at..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(src),
    }
}

/// Byte offset of the `.` opening the extension segment, if any.
fn extension_start(src: &str) -> Option<usize> {
    src.bytes()
        .enumerate()
        .filter(|&(_, b)| b == b'.')
        .map(|(i, _)| i)
        .find(|&i| extension_matches(&src[i + 1..]))
}

/// `tail` is everything after a candidate `.`.
fn extension_matches(tail: &str) -> bool {
    let run = tail
        .bytes()
        .take(4)
        .take_while(|b| (b'A'..=b'z').contains(b))
        .count();
    // Prefer the 4-char extension, fall back to 3.
    (3..=run).rev().any(|n| trailer_matches(&tail[n..]))
}

/// Optional `/`, optional `?query`, then end of string.
fn trailer_matches(rest: &str) -> bool {
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    match rest.strip_prefix('?') {
        Some(query) => !query.contains(is_line_terminator),
        None => rest.is_empty(),
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
