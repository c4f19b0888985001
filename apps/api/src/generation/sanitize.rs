//! Input sanitization applied before any text reaches the model.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum characters forwarded to the model.
pub const MAX_INPUT_CHARS: usize = 5000;
pub const TRUNCATION_MARKER: &str = "...";

static SCRIPT_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("valid regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Strips markup and caps the length.
///
/// `<script>`/`<style>` blocks are removed with their content, any other tag
/// is removed leaving its text. Output longer than `MAX_INPUT_CHARS` is cut
/// and suffixed with `TRUNCATION_MARKER`.
pub fn sanitize(text: &str) -> String {
    let without_blocks = SCRIPT_BLOCK_RE.replace_all(text, "");
    let without_tags = TAG_RE.replace_all(&without_blocks, "");
    let trimmed = without_tags.trim();

    match trimmed.char_indices().nth(MAX_INPUT_CHARS) {
        Some((cut, _)) => format!("{}{}", &trimmed[..cut], TRUNCATION_MARKER),
        None => trimmed.to_string(),
    }
}

/// The first `max_chars` characters of `text`, on a char boundary.
pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_block_with_content() {
        let input = "Rust developer<script>alert('pwned')</script> wanted";
        assert_eq!(sanitize(input), "Rust developer wanted");
    }

    #[test]
    fn test_strips_multiline_uppercase_script() {
        let input = "Before<SCRIPT type=\"text/javascript\">\nvar x = 1;\n</SCRIPT>After";
        assert_eq!(sanitize(input), "BeforeAfter");
    }

    #[test]
    fn test_strips_style_block() {
        assert_eq!(sanitize("<style>p{color:red}</style>Hello"), "Hello");
    }

    #[test]
    fn test_strips_plain_tags_keeps_text() {
        assert_eq!(
            sanitize("<p>Senior <b>Backend</b> Engineer</p>"),
            "Senior Backend Engineer"
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize("   hello  \n"), "hello");
    }

    #[test]
    fn test_short_input_untouched() {
        let input = "A".repeat(MAX_INPUT_CHARS);
        assert_eq!(sanitize(&input), input);
    }

    #[test]
    fn test_truncates_long_input_with_marker() {
        let input = "a".repeat(MAX_INPUT_CHARS + 100);
        let out = sanitize(&input);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), MAX_INPUT_CHARS + TRUNCATION_MARKER.len());
    }

    #[test]
    fn test_truncation_respects_multibyte_chars() {
        let input = "ż".repeat(MAX_INPUT_CHARS + 1);
        let out = sanitize(&input);
        assert_eq!(out.chars().filter(|c| *c == 'ż').count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_empty_and_markup_only() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("<div><br/></div>"), "");
    }

    #[test]
    fn test_prefix_chars() {
        assert_eq!(prefix_chars("doświadczenie", 4), "dośw");
        assert_eq!(prefix_chars("abc", 10), "abc");
    }
}
