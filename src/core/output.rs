//! Bounded text helpers for report lines.

/// Collapse whitespace and cut to `max_chars`, marking the cut with `...`.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Join up to `max_items` names with `, ` and count the rest.
pub fn preview_list<S: AsRef<str>>(items: &[S], max_items: usize, max_chars: usize) -> String {
    let shown = items
        .iter()
        .take(max_items)
        .map(|s| compact_line(s.as_ref(), max_chars))
        .collect::<Vec<_>>()
        .join(", ");
    match items.len().checked_sub(max_items) {
        Some(rest) if rest > 0 => format!("{} (+{} more)", shown, rest),
        _ => shown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_line_collapses_and_truncates() {
        assert_eq!(compact_line("a\n  b\tc", 10), "a b c");
        assert_eq!(compact_line("abcdefgh", 4), "abcd...");
    }

    #[test]
    fn preview_counts_hidden_items() {
        assert_eq!(preview_list(&["a", "b", "c"], 2, 10), "a, b (+1 more)");
        assert_eq!(preview_list(&["a"], 2, 10), "a");
        assert_eq!(preview_list::<&str>(&[], 2, 10), "");
    }
}
