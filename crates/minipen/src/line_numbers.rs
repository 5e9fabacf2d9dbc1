//! Line-number gutter text for a pane.
//!
//! The annotation is derived data: it is rebuilt from the whole pane text on
//! every mutation and never patched incrementally.

/// Number of `'\n'`-delimited segments, so an empty text has one line and a
/// trailing newline adds an (empty) line of its own.
pub fn line_count(text: &str) -> usize {
    text.bytes().filter(|byte| *byte == b'\n').count() + 1
}

/// Ascending line numbers `1..=line_count(text)` joined by newlines.
pub fn annotate(text: &str) -> String {
    let count = line_count(text);
    let mut numbers = String::with_capacity(count * 3);
    for number in 1..=count {
        if number > 1 {
            numbers.push('\n');
        }
        numbers.push_str(&number.to_string());
    }
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_one_line() {
        assert_eq!(line_count(""), 1);
        assert_eq!(annotate(""), "1");
    }

    #[test]
    fn counts_newline_delimited_segments() {
        assert_eq!(annotate("a\nb"), "1\n2");
        assert_eq!(annotate("a\nb\nc"), "1\n2\n3");
    }

    #[test]
    fn trailing_newline_numbers_the_empty_last_line() {
        assert_eq!(annotate("a\n"), "1\n2");
        assert_eq!(annotate("\n\n"), "1\n2\n3");
    }

    #[test]
    fn carriage_returns_are_not_line_breaks() {
        assert_eq!(line_count("a\r\nb\rc"), 2);
    }

    #[test]
    fn count_matches_annotation_length() {
        for text in ["", "x", "x\n", "\n", "one\ntwo\n\nfour", "ž\n😀\n"] {
            let annotation = annotate(text);
            assert_eq!(annotation.lines().count(), line_count(text), "text: {text:?}");
            assert_eq!(line_count(text), text.matches('\n').count() + 1);
        }
    }
}
