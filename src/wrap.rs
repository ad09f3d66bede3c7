//! Fixed-width line wrapping for the screen grid
//!
//! Widths are counted in characters, not bytes, so transliterated titles
//! that still carry non-ASCII letters never split inside a code point.

/// Wrap `text` into lines of exactly `width` characters
///
/// Newlines become spaces. Lines break at the last space that fits, or are
/// hard-cut at `width` when no usable space exists. Every line is padded
/// with spaces to `width`, and at least one line is always returned.
///
/// # Example
///
/// ```
/// use rss3270::wrap::wrap;
///
/// let lines = wrap("the quick brown fox", 10);
/// assert_eq!(lines, vec!["the quick ", "brown fox "]);
/// ```
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest: Vec<char> = text
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();

    while width > 0 && rest.len() > width {
        // A space exactly at `width` is also a valid break point
        let cut = match rest[..=width].iter().rposition(|&c| c == ' ') {
            Some(idx) if idx > 0 => idx,
            _ => width,
        };

        let line: String = rest[..cut].iter().collect();
        lines.push(pad_right(&line, width));

        let skip = rest[cut..]
            .iter()
            .take_while(|c| c.is_whitespace())
            .count();
        rest.drain(..cut + skip);
    }

    let last: String = rest.into_iter().collect();
    lines.push(pad_right(&last, width));
    lines
}

/// Pad `s` with spaces to `width` characters, truncating if longer
pub fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.chars().take(width).collect();
    }
    let mut out = String::with_capacity(s.len() + width - len);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Center `s` in `width` characters, extra padding going to the right
pub fn pad_center(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.chars().take(width).collect();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    let mut out = String::with_capacity(s.len() + width - len);
    out.extend(std::iter::repeat_n(' ', left));
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', right));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_single_padded_line() {
        assert_eq!(wrap("hello", 8), vec!["hello   "]);
    }

    #[test]
    fn test_empty_text_yields_blank_line() {
        assert_eq!(wrap("", 4), vec!["    "]);
    }

    #[test]
    fn test_breaks_on_last_space() {
        assert_eq!(
            wrap("aaa bbb ccc ddd", 8),
            vec!["aaa bbb ", "ccc ddd "]
        );
    }

    #[test]
    fn test_space_exactly_at_width_is_break_point() {
        // "abcd efgh": space at index 4 with width 4
        assert_eq!(wrap("abcd efgh", 4), vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_hard_cut_without_spaces() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij  "]);
    }

    #[test]
    fn test_leading_space_is_not_a_break_point() {
        assert_eq!(wrap(" abcdefgh", 4), vec![" abc", "defg", "h   "]);
    }

    #[test]
    fn test_newlines_collapse_to_spaces() {
        assert_eq!(wrap("one\ntwo", 10), vec!["one two   "]);
    }

    #[test]
    fn test_multibyte_characters_counted_once() {
        let lines = wrap("Öl Öl Öl", 5);
        assert_eq!(lines, vec!["Öl Öl", "Öl   "]);
        assert!(lines.iter().all(|l| l.chars().count() == 5));
    }

    #[test]
    fn test_pad_helpers() {
        assert_eq!(pad_right("abc", 5), "abc  ");
        assert_eq!(pad_right("abcdef", 3), "abc");
        assert_eq!(pad_center("ab", 7), "  ab   ");
        assert_eq!(pad_center("abcdef", 4), "abcd");
    }

    proptest! {
        #[test]
        fn wrapped_lines_have_exact_width(text in "[a-z \\n]{0,300}", width in 1usize..100) {
            let lines = wrap(&text, width);
            prop_assert!(!lines.is_empty());
            for line in &lines {
                prop_assert_eq!(line.chars().count(), width);
            }
        }

        #[test]
        fn wrapping_keeps_every_non_space_character(text in "[a-zA-Z0-9 .,\\n]{0,300}", width in 1usize..100) {
            let lines = wrap(&text, width);
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let wrapped: String = lines
                .iter()
                .flat_map(|l| l.chars())
                .filter(|c| !c.is_whitespace())
                .collect();
            prop_assert_eq!(original, wrapped);
        }
    }
}
