//! Greedy word wrapping for the text reports.

/// Wrap `text` to lines of at most `width` characters.
///
/// The first line starts with `initial_indent`, the rest with
/// `subsequent_indent`. Words longer than a line are broken.
pub(crate) fn fill(text: &str, width: usize, initial_indent: &str, subsequent_indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::from(initial_indent);
    let mut line_len = initial_indent.chars().count();
    let mut line_has_words = false;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        loop {
            let sep = usize::from(line_has_words);
            let available = width.saturating_sub(line_len + sep);

            if word.len() <= available {
                if line_has_words {
                    line.push(' ');
                }
                line.extend(word.iter());
                line_len += sep + word.len();
                line_has_words = true;
                break;
            }

            if line_has_words {
                // Start a new line and retry the word there.
                lines.push(std::mem::take(&mut line));
                line.push_str(subsequent_indent);
                line_len = subsequent_indent.chars().count();
                line_has_words = false;
                continue;
            }

            // Word does not fit on an empty line: break it.
            let take = available.max(1);
            let rest = word.split_off(take.min(word.len()));
            line.extend(word.iter());
            lines.push(std::mem::take(&mut line));
            line.push_str(subsequent_indent);
            line_len = subsequent_indent.chars().count();
            word = rest;
            if word.is_empty() {
                break;
            }
        }
    }

    if line_has_words || lines.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(fill("hello world", 80, "  ", "  "), "  hello world");
    }

    #[test]
    fn test_wraps_at_width() {
        let text = fill("aaa bbb ccc ddd", 9, "", "  ");
        assert_eq!(text, "aaa bbb\n  ccc ddd");
        assert!(text.lines().all(|l| l.chars().count() <= 9));
    }

    #[test]
    fn test_breaks_long_words() {
        assert_eq!(fill("abcdefghij", 4, "", ""), "abcd\nefgh\nij");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(fill("a\n  b\tc", 80, "", ""), "a b c");
    }
}
