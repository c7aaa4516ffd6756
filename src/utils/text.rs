//! Text utilities

/// Strip trailing `\n` characters, the only normalization applied to outputs
pub fn strip_trailing_newlines(s: &str) -> &str {
    s.trim_end_matches('\n')
}

/// Bound a text for display, appending a marker with the number of hidden
/// characters
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        return s.to_string();
    }

    let kept: String = s.chars().take(max_chars).collect();
    format!("{}\n... ({} more characters)", kept, total - max_chars)
}

/// Bound raw process output to `max_bytes`, decoding lossily
pub fn lossy_prefix(bytes: &[u8], max_bytes: usize) -> String {
    let end = bytes.len().min(max_bytes);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
