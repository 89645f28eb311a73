//! UTF-8 safe truncation for log previews

/// Longest prefix of `s` holding at most `max_chars` characters
///
/// ```
/// use codemaster::utils::truncate_str;
///
/// assert_eq!(truncate_str("print(\"héllo\")", 9), "print(\"hé");
/// assert_eq!(truncate_str("x = 1", 100), "x = 1");
/// ```
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate to `max_chars` and append `suffix` when anything was cut
///
/// ```
/// use codemaster::utils::truncate_with_suffix;
///
/// assert_eq!(truncate_with_suffix("Compilation Error", 11, "..."), "Compilation...");
/// assert_eq!(truncate_with_suffix("ok", 5, "..."), "ok");
/// ```
pub fn truncate_with_suffix(s: &str, max_chars: usize, suffix: &str) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!("{}{}", truncate_str(s, max_chars), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_preview_ascii() {
        let source = "public class HelloWorld {}";
        assert_eq!(truncate_str(source, 12), "public class");
        assert_eq!(truncate_str(source, 100), source);
    }

    #[test]
    fn test_multibyte_output_is_cut_on_char_boundary() {
        // "print(\"日本語\")"
        let source = "print(\"\u{65e5}\u{672c}\u{8a9e}\")";
        assert_eq!(truncate_str(source, 7), "print(\"");
        assert_eq!(truncate_str(source, 8), "print(\"\u{65e5}");
        assert_eq!(truncate_str(source, 9), "print(\"\u{65e5}\u{672c}");
    }

    #[test]
    fn test_stdout_with_emoji() {
        // waving hand followed by a skin tone modifier counts as two chars
        let stdout = "done \u{1f44b}\u{1f3fb}!";
        assert_eq!(truncate_str(stdout, 5), "done ");
        assert_eq!(truncate_str(stdout, 6), "done \u{1f44b}");
        assert_eq!(truncate_with_suffix(stdout, 6, "..."), "done \u{1f44b}...");
    }

    #[test]
    fn test_truncate_with_suffix() {
        let output = "Execution timeout - please try again";
        assert_eq!(truncate_with_suffix(output, 17, "..."), "Execution timeout...");
        assert_eq!(truncate_with_suffix(output, 100, "..."), output);
    }

    #[test]
    fn test_truncate_empty() {
        assert_eq!(truncate_str("", 10), "");
        assert_eq!(truncate_with_suffix("", 10, "..."), "");
    }
}
