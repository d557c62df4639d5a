// revolt rejects messages above this many characters
pub const MESSAGE_LIMIT: usize = 2000;

// Simple markdown formating
pub fn md_fmt(message: &str, emoji: RE) -> String {
    let emoji = RE::e(emoji);

    format!("{emoji} `{message}`")
}

// Command emojis
pub enum RE {
    Insert,
    Rm,
    Search,
    Send,
    Clear,
}

impl RE {
    pub fn e(self) -> &'static str {
        match self {
            RE::Insert => "📥",
            RE::Rm => "🗑️",
            RE::Search => "🔎",
            RE::Send => "📤",
            RE::Clear => "🧹",
        }
    }
}

/// Packs lines into messages no longer than `limit` characters.
/// A single line longer than `limit` is hard-split.
pub fn chunk_lines<'a>(lines: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines {
        let mut line = line;
        while line.chars().count() > limit {
            let split = line
                .char_indices()
                .nth(limit)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(line[..split].to_string());
            line = &line[split..];
        }

        let needed = if current.is_empty() {
            line.chars().count()
        } else {
            current.chars().count() + 1 + line.chars().count()
        };
        if needed > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_share_a_chunk() {
        assert_eq!(chunk_lines(["a", "b", "c"], 10), vec!["a\nb\nc"]);
    }

    #[test]
    fn chunks_respect_limit_without_losing_lines() {
        let lines = ["aaaa", "bbbb", "cccc"];
        let chunks = chunk_lines(lines, 9);

        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn long_line_is_split() {
        let chunks = chunk_lines(["x", "abcdefgh"], 3);
        assert_eq!(chunks, vec!["x", "abc", "def", "gh"]);
    }

    #[test]
    fn empty_input_gives_nothing() {
        assert!(chunk_lines(std::iter::empty(), 10).is_empty());
    }

    #[test]
    fn md_fmt_wraps_command() {
        assert_eq!(md_fmt("!list", RE::Search), "🔎 `!list`");
    }
}
