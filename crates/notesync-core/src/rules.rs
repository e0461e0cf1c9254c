//! Ordered line matchers for content outside code fences.
//!
//! Several markers overlap (`"- [ ] "` also starts with `"- "`, `"### "`
//! also starts with `"#"`), so the first matching rule in [`LINE_RULES`]
//! wins. Fence handling is stateful and lives in the parser; everything here
//! is a pure function of one right-trimmed line.

use std::borrow::Cow;

use crate::block::Block;

/// Marker that opens and closes a code block.
pub const FENCE: &str = "```";

/// A single classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    /// `### text`
    Heading3,
    /// `## text`
    Heading2,
    /// `# text`
    Heading1,
    /// `- [ ] text`
    UncheckedItem,
    /// `- [x] text`
    CheckedItem,
    /// `- text` or `*text`
    Bullet,
    /// `12. text`
    Numbered,
    /// `> text`
    Quote,
    /// `---`
    Divider,
    /// Any non-blank line.
    Paragraph,
}

/// Rules in priority order. Longest heading marker first, and checklist
/// items strictly before generic bullets.
pub const LINE_RULES: [LineRule; 10] = [
    LineRule::Heading3,
    LineRule::Heading2,
    LineRule::Heading1,
    LineRule::UncheckedItem,
    LineRule::CheckedItem,
    LineRule::Bullet,
    LineRule::Numbered,
    LineRule::Quote,
    LineRule::Divider,
    LineRule::Paragraph,
];

impl LineRule {
    /// Try this rule against a right-trimmed line.
    pub fn apply(self, line: &str) -> Option<Block> {
        match self {
            LineRule::Heading3 => line.strip_prefix("### ").map(|t| Block::heading(3, t)),
            LineRule::Heading2 => line.strip_prefix("## ").map(|t| Block::heading(2, t)),
            LineRule::Heading1 => line.strip_prefix("# ").map(|t| Block::heading(1, t)),
            LineRule::UncheckedItem => line
                .strip_prefix("- [ ] ")
                .map(|t| Block::checklist(false, t)),
            LineRule::CheckedItem => line
                .strip_prefix("- [x] ")
                .map(|t| Block::checklist(true, t)),
            LineRule::Bullet => {
                if line.starts_with("- ") || line.starts_with('*') {
                    Some(Block::bullet(skip_chars(line, 2)))
                } else {
                    None
                }
            }
            LineRule::Numbered => {
                numbered_prefix_len(line).map(|len| Block::numbered(&line[len..]))
            }
            LineRule::Quote => line.strip_prefix("> ").map(Block::quote),
            LineRule::Divider => (line.trim() == "---").then_some(Block::Divider),
            LineRule::Paragraph => {
                let trimmed = line.trim();
                (!trimmed.is_empty()).then(|| Block::paragraph(trimmed))
            }
        }
    }
}

/// Classify a line that is outside any code block.
///
/// Returns `None` for blank lines.
pub fn classify(line: &str) -> Option<Block> {
    LINE_RULES.iter().find_map(|rule| rule.apply(line))
}

/// The first rule that matches `line`, if any.
pub fn matching_rule(line: &str) -> Option<LineRule> {
    LINE_RULES
        .iter()
        .copied()
        .find(|rule| rule.apply(line).is_some())
}

/// If `line` is a fence, its info string: the line with every fence marker
/// removed and surrounding whitespace trimmed.
///
/// Borrows unless a second marker has to be cut out, as in ```` ```python``` ````.
pub fn fence_info(line: &str) -> Option<Cow<'_, str>> {
    let rest = line.strip_prefix(FENCE)?;
    if rest.contains(FENCE) {
        Some(Cow::Owned(rest.replace(FENCE, "").trim().to_string()))
    } else {
        Some(Cow::Borrowed(rest.trim()))
    }
}

/// Drop the first `n` characters of `s` (not bytes).
#[inline]
fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// Length in bytes of a leading `digits '.' whitespace` marker.
///
/// Digits are any numeric characters, so `٣. ` and `３. ` count as well.
fn numbered_prefix_len(line: &str) -> Option<usize> {
    let digits: usize = line
        .chars()
        .take_while(|c| c.is_numeric())
        .map(char::len_utf8)
        .sum();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let space = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some(digits + 1 + space.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn position(rule: LineRule) -> usize {
        LINE_RULES.iter().position(|r| *r == rule).unwrap()
    }

    #[test]
    fn checklist_rules_precede_bullet() {
        assert!(position(LineRule::UncheckedItem) < position(LineRule::Bullet));
        assert!(position(LineRule::CheckedItem) < position(LineRule::Bullet));
    }

    #[test]
    fn longer_heading_markers_come_first() {
        assert!(position(LineRule::Heading3) < position(LineRule::Heading2));
        assert!(position(LineRule::Heading2) < position(LineRule::Heading1));
    }

    #[test]
    fn paragraph_is_the_fallback() {
        assert_eq!(LINE_RULES.last(), Some(&LineRule::Paragraph));
    }

    #[rstest]
    #[case("### a", LineRule::Heading3)]
    #[case("## a", LineRule::Heading2)]
    #[case("# a", LineRule::Heading1)]
    #[case("- [ ] a", LineRule::UncheckedItem)]
    #[case("- [x] a", LineRule::CheckedItem)]
    #[case("- [X] a", LineRule::Bullet)]
    #[case("- a", LineRule::Bullet)]
    #[case("*a", LineRule::Bullet)]
    #[case("10. a", LineRule::Numbered)]
    #[case("٣. a", LineRule::Numbered)]
    #[case("١٢. a", LineRule::Numbered)]
    #[case("> a", LineRule::Quote)]
    #[case("---", LineRule::Divider)]
    #[case("#hashtag", LineRule::Paragraph)]
    #[case("1.5 litres", LineRule::Paragraph)]
    #[case(">no space", LineRule::Paragraph)]
    fn first_matching_rule(#[case] line: &str, #[case] expected: LineRule) {
        assert_eq!(matching_rule(line), Some(expected));
    }

    #[test]
    fn blank_line_matches_nothing() {
        assert_eq!(matching_rule(""), None);
        assert_eq!(classify("   "), None);
    }

    #[rstest]
    #[case("- [ ] buy milk", Block::checklist(false, "buy milk"))]
    #[case("- [x] done task", Block::checklist(true, "done task"))]
    #[case("- item", Block::bullet("item"))]
    #[case("* star", Block::bullet("star"))]
    #[case("*", Block::bullet(""))]
    #[case("*é and more", Block::bullet(" and more"))]
    #[case("3.\tthird", Block::numbered("third"))]
    #[case("٢. ثاني", Block::numbered("ثاني"))]
    #[case("１２. wide", Block::numbered("wide"))]
    #[case("> quoted", Block::quote("quoted"))]
    #[case("#  spaced", Block::heading(1, " spaced"))]
    #[case("   indented   ", Block::paragraph("indented"))]
    #[case("  ---", Block::Divider)]
    fn classifies_line(#[case] line: &str, #[case] expected: Block) {
        assert_eq!(classify(line), Some(expected));
    }

    #[rstest]
    #[case("```python", Some("python"))]
    #[case("```  rust  ", Some("rust"))]
    #[case("```", Some(""))]
    #[case("```python```", Some("python"))]
    #[case("``` sh ``` ```", Some("sh"))]
    #[case("``````", Some(""))]
    #[case(" ```", None)]
    fn fence_info_strips_every_marker(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(fence_info(line).as_deref(), expected);
    }

    #[test]
    fn fence_info_borrows_single_marker() {
        assert!(matches!(fence_info("```go"), Some(Cow::Borrowed("go"))));
    }
}
