//! String utilities for the domain layer.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Take the first `max_chars` characters of a string.
///
/// Counts Unicode scalar values, not bytes, so a preview of 500 characters
/// holds 500 characters regardless of script.
pub fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
