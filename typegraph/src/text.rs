//! Formatting helpers shared by the emitters.

/// Greedy word wrap.
///
/// Whitespace runs collapse to one space and words are never split; a word
/// longer than `width` sits on a line of its own. Lines after the first are
/// joined with `line_break`, so comment prefixes can be carried along, e.g.
/// `wrap_text("/// long text", 100, "\n/// ")`.
pub fn wrap_text(text: &str, width: usize, line_break: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len == 0 {
            out.push_str(word);
            line_len = word_len;
        } else if line_len + 1 + word_len <= width {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + word_len;
        } else {
            out.push_str(line_break);
            out.push_str(word);
            // The break may carry a prefix that counts toward the next line.
            line_len = prefix_len(line_break) + word_len;
        }
    }

    out
}

/// Join `items` one per line, indenting every line after the first.
pub fn insert_list<S: AsRef<str>>(items: &[S], indent: usize) -> String {
    let separator = format!("\n{}", " ".repeat(indent));
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Indent every non-empty line of `block` by `indent` spaces.
pub fn indent_block(block: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn prefix_len(line_break: &str) -> usize {
    line_break
        .rsplit('\n')
        .next()
        .map(|p| p.chars().count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wrap_short_text_unchanged() {
        assert_eq!(wrap_text("a short line", 80, "\n"), "a short line");
    }

    #[test]
    fn test_wrap_breaks_at_width() {
        let wrapped = wrap_text("one two three four five", 9, "\n");
        assert_eq!(wrapped, "one two\nthree\nfour five");
        assert!(wrapped.lines().all(|l| l.len() <= 9));
    }

    #[test]
    fn test_wrap_carries_prefix() {
        let wrapped = wrap_text("/// alpha beta gamma delta", 16, "\n/// ");
        assert_eq!(wrapped, "/// alpha beta\n/// gamma delta");
        assert!(wrapped.lines().all(|l| l.starts_with("/// ")));
    }

    #[test]
    fn test_wrap_long_word_kept_whole() {
        assert_eq!(wrap_text("a supercalifragilistic b", 5, "\n"), "a\nsupercalifragilistic\nb");
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(wrap_text("  a \n\n b  ", 80, "\n"), "a b");
        assert_eq!(wrap_text("", 80, "\n"), "");
    }

    #[test]
    fn test_insert_list() {
        assert_eq!(insert_list(&["a = 1", "b = 2"], 4), "a = 1\n    b = 2");
        assert_eq!(insert_list::<&str>(&[], 4), "");
    }

    #[test]
    fn test_indent_block() {
        assert_eq!(indent_block("a\n\nb", 2), "  a\n\n  b");
    }
}
