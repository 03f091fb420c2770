//! String utilities for the domain layer.

/// Keep at most `max_chars` characters of `s`.
///
/// Counts Unicode scalar values rather than bytes, so mixed-script model
/// output is cut at the same visible length regardless of encoding width.
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len.saturating_sub(3);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chars_ascii() {
        assert_eq!(take_chars("hello world", 5), "hello");
        assert_eq!(take_chars("hi", 10), "hi");
        assert_eq!(take_chars("", 3), "");
    }

    #[test]
    fn test_take_chars_multibyte() {
        assert_eq!(take_chars("诊断意见如下", 2), "诊断");
        assert_eq!(take_chars("诊断", 2), "诊断");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("fever", 10), "fever");
        assert_eq!(truncate("persistent cough", 9), "persis...");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        // Each CJK character is 3 bytes; target 7 backs off to 6.
        assert_eq!(truncate("发热三天伴咳嗽", 10), "发热...");
    }
}
