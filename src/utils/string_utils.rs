/// Pure string processing utilities (Discord-agnostic)

/// Replace literal \n with actual newlines
pub fn process_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Check if a string is empty after trimming
pub fn is_empty_or_whitespace(text: &str) -> bool {
    text.trim().is_empty()
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Prefers breaking after the last newline in a chunk, then after the last
/// space, and only cuts mid-word when neither exists.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut rest: Vec<char> = text.trim().chars().collect();

    while rest.len() > max_chars {
        let window = &rest[..max_chars];
        let cut = window
            .iter()
            .rposition(|c| *c == '\n')
            .or_else(|| window.iter().rposition(|c| *c == ' '))
            .filter(|pos| *pos > 0)
            .map(|pos| pos + 1)
            .unwrap_or(max_chars);

        let chunk: String = rest[..cut].iter().collect();
        let chunk = chunk.trim_end().to_string();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        rest.drain(..cut);
    }

    let tail: String = rest.into_iter().collect();
    let tail = tail.trim().to_string();
    if !tail.is_empty() {
        chunks.push(tail);
    }

    chunks
}

/// Remove a leading user mention (`<@id>` or `<@!id>`) and surrounding whitespace
pub fn strip_mention(text: &str, user_id: u64) -> String {
    let plain = format!("<@{}>", user_id);
    let nick = format!("<@!{}>", user_id);
    text.replace(&plain, "").replace(&nick, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_newlines() {
        assert_eq!(process_newlines("Hello\\nWorld"), "Hello\nWorld");
        assert_eq!(process_newlines("No newlines"), "No newlines");
    }

    #[test]
    fn test_is_empty_or_whitespace() {
        assert!(is_empty_or_whitespace(""));
        assert!(is_empty_or_whitespace(" \t\n"));
        assert!(!is_empty_or_whitespace("  text  "));
    }

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("hello", 2000), vec!["hello"]);
        assert!(split_message("   ", 2000).is_empty());
    }

    #[test]
    fn test_split_respects_limit() {
        let text = "word ".repeat(1000);
        let chunks = split_message(&text, 2000);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 2000));
        assert_eq!(
            chunks.concat().replace(' ', ""),
            text.replace(' ', "")
        );
    }

    #[test]
    fn test_split_prefers_newlines() {
        let chunks = split_message("aaaa\nbbbb cccc", 10);
        assert_eq!(chunks, vec!["aaaa", "bbbb cccc"]);
    }

    #[test]
    fn test_split_hard_cut_without_spaces() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_split_counts_chars_not_bytes() {
        let text = "س".repeat(2500);
        let chunks = split_message(&text, 2000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 2000);
        assert_eq!(chunks[1].chars().count(), 500);
    }

    #[test]
    fn test_strip_mention() {
        assert_eq!(strip_mention("<@42> what is zakat?", 42), "what is zakat?");
        assert_eq!(strip_mention("hey <@!42>", 42), "hey");
        assert_eq!(strip_mention("<@7> hi", 42), "<@7> hi");
    }
}
