//! Line-oriented parser for the markdown subset the resume writer produces.
//!
//! Each line is trimmed and classified on its own; there is no inline structure
//! beyond emphasis markers, which are stripped so the PDF never shows raw `**`.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading(String),
    SubHeading(String),
    /// Bullet text without its `-`/`*` marker.
    Bullet(String),
    /// Full item text including the `N.` marker.
    NumberedItem(String),
    Plain(String),
    Blank,
}

/// A parsed markdown file, rebuilt from disk for every render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    pub blocks: Vec<Block>,
}

pub fn parse_markdown(source: &str) -> RenderedDocument {
    RenderedDocument {
        blocks: source.lines().map(classify_line).collect(),
    }
}

/// Classifies one line. First match wins: title, heading, subheading, bullet,
/// numbered item, then plain text.
pub fn classify_line(line: &str) -> Block {
    static NUMBERED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\d+\.)\s+(.*)$").expect("valid regex"));

    let line = line.trim();
    if line.is_empty() {
        return Block::Blank;
    }

    if let Some(rest) = line.strip_prefix("# ") {
        return Block::Title(strip_emphasis(rest.trim()));
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return Block::Heading(strip_emphasis(rest.trim()));
    }
    if let Some(rest) = line.strip_prefix("### ") {
        return Block::SubHeading(strip_emphasis(rest.trim()));
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::Bullet(strip_emphasis(rest.trim()));
    }
    if let Some(caps) = NUMBERED_RE.captures(line) {
        return Block::NumberedItem(format!("{} {}", &caps[1], strip_emphasis(&caps[2])));
    }

    Block::Plain(strip_emphasis(line))
}

/// Removes markdown emphasis markers.
///
/// `**` and `__` go everywhere. A single `*` or `_` is dropped only where it sits
/// at the edge of a word, so `snake_case` and a lone `*` survive.
pub fn strip_emphasis(text: &str) -> String {
    let text = text.replace("**", "").replace("__", "");
    text.split(' ')
        .map(strip_word_markers)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_word_markers(word: &str) -> String {
    let is_marker = |c: char| c == '*' || c == '_';
    if word.is_empty() || word.chars().all(is_marker) {
        return word.to_string();
    }

    let start = word
        .char_indices()
        .find(|(_, c)| c.is_alphanumeric())
        .map_or(word.len(), |(i, _)| i);
    let end = word
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map_or(start, |(i, c)| i + c.len_utf8());

    let (prefix, rest) = word.split_at(start);
    let (core, suffix) = rest.split_at(end - start);
    let without = |s: &str| s.chars().filter(|c| !is_marker(*c)).collect::<String>();

    format!("{}{}{}", without(prefix), core, without(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_sample_classifies_in_order() {
        let doc = parse_markdown("# Jane Doe\n## Experience\n- **Led** migration to Rust");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Title("Jane Doe".to_string()),
                Block::Heading("Experience".to_string()),
                Block::Bullet("Led migration to Rust".to_string()),
            ]
        );
    }

    #[test]
    fn test_name_and_experience_bullets() {
        let doc = parse_markdown("# John Doe\n\n## Experience\n- Built X\n- Built Y\n");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Title("John Doe".to_string()),
                Block::Blank,
                Block::Heading("Experience".to_string()),
                Block::Bullet("Built X".to_string()),
                Block::Bullet("Built Y".to_string()),
            ]
        );
    }

    #[test]
    fn test_classification_is_stable() {
        for line in ["# Name", "- item", "3. step", "plain words", ""] {
            assert_eq!(classify_line(line), classify_line(line));
        }
        // a plain line's stripped text classifies to the same block again
        let Block::Plain(text) = classify_line("uses *tokio* daily") else {
            panic!("expected plain");
        };
        assert_eq!(classify_line(&text), Block::Plain(text.clone()));
    }

    #[test]
    fn test_every_block_kind() {
        let source = "# T\n\n## H\n### S\n* star bullet\n12.  Twelfth\nplain *text*\n   ";
        let doc = parse_markdown(source);
        assert_eq!(
            doc.blocks,
            vec![
                Block::Title("T".to_string()),
                Block::Blank,
                Block::Heading("H".to_string()),
                Block::SubHeading("S".to_string()),
                Block::Bullet("star bullet".to_string()),
                Block::NumberedItem("12. Twelfth".to_string()),
                Block::Plain("plain text".to_string()),
                Block::Blank,
            ]
        );
    }

    #[test]
    fn test_lines_are_trimmed_before_matching() {
        assert_eq!(
            classify_line("   - indented bullet  "),
            Block::Bullet("indented bullet".to_string())
        );
        assert_eq!(
            classify_line("#NoSpace"),
            Block::Plain("#NoSpace".to_string())
        );
    }

    #[test]
    fn test_heading_markers_need_exact_level() {
        assert_eq!(
            classify_line("#### Deep"),
            Block::Plain("#### Deep".to_string())
        );
        assert_eq!(classify_line("1.5 years"), Block::Plain("1.5 years".to_string()));
    }

    #[test]
    fn test_strip_emphasis_keeps_words() {
        assert_eq!(strip_emphasis("**Rust** and __Go__"), "Rust and Go");
        assert_eq!(strip_emphasis("uses snake_case names"), "uses snake_case names");
        assert_eq!(strip_emphasis("(*see* below)."), "(see below).");
        assert_eq!(strip_emphasis("_italic_, done"), "italic, done");
        assert_eq!(strip_emphasis("5 * 3"), "5 * 3");
    }

    #[test]
    fn test_emphasis_is_stripped_in_every_text_block() {
        let doc = parse_markdown("# **Name**\n## _Skills_\n1. **Tokio** expert");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Title("Name".to_string()),
                Block::Heading("Skills".to_string()),
                Block::NumberedItem("1. Tokio expert".to_string()),
            ]
        );
    }

    #[test]
    fn test_table_rows_keep_their_content() {
        let block = classify_line("| Skill | Years |");
        assert_eq!(block, Block::Plain("| Skill | Years |".to_string()));
    }
}
