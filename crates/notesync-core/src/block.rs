//! Block types produced by the parser.
//!
//! A [`Block`] is one structured unit of note content. The set of kinds is
//! closed and each variant carries only the fields that kind needs:
//!
//! - **Owned**: blocks outlive the input lines they came from
//! - **Flat**: no nesting, one block per triggering line
//! - **Wire-agnostic**: mapping to a remote API lives in [`crate::notion`]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language tag given to a code block whose opening fence names none.
///
/// Also a valid Notion code language, so it can be sent as-is.
pub const UNSPECIFIED_LANGUAGE: &str = "plain text";

/// Block-level content.
///
/// Serializes with a `type` tag holding the [`BlockKind`] name, e.g.
/// `{"type":"checklist_item","checked":false,"text":"buy milk"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `# ` heading.
    Heading1 { text: String },
    /// `## ` heading.
    Heading2 { text: String },
    /// `### ` heading.
    Heading3 { text: String },
    /// `- ` or `*` list item.
    BulletedListItem { text: String },
    /// `1. ` list item.
    NumberedListItem { text: String },
    /// `- [ ] ` / `- [x] ` task.
    ChecklistItem { checked: bool, text: String },
    /// `> ` quotation.
    Quote { text: String },
    /// Horizontal rule (`---`).
    Divider,
    /// Fenced code with its language tag and newline-joined body.
    Code { language: String, text: String },
    /// Anything else that is not blank.
    Paragraph { text: String },
}

impl Block {
    /// Build a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Build a heading block, clamping `level` into `1..=3`.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        let text = text.into();
        match level {
            0 | 1 => Block::Heading1 { text },
            2 => Block::Heading2 { text },
            _ => Block::Heading3 { text },
        }
    }

    /// Build a bulleted list item.
    pub fn bullet(text: impl Into<String>) -> Self {
        Block::BulletedListItem { text: text.into() }
    }

    /// Build a numbered list item.
    pub fn numbered(text: impl Into<String>) -> Self {
        Block::NumberedListItem { text: text.into() }
    }

    /// Build a checklist item.
    pub fn checklist(checked: bool, text: impl Into<String>) -> Self {
        Block::ChecklistItem {
            checked,
            text: text.into(),
        }
    }

    /// Build a quote block.
    pub fn quote(text: impl Into<String>) -> Self {
        Block::Quote { text: text.into() }
    }

    /// Build a code block.
    pub fn code(language: impl Into<String>, text: impl Into<String>) -> Self {
        Block::Code {
            language: language.into(),
            text: text.into(),
        }
    }

    /// The field-less kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading1 { .. } => BlockKind::Heading1,
            Block::Heading2 { .. } => BlockKind::Heading2,
            Block::Heading3 { .. } => BlockKind::Heading3,
            Block::BulletedListItem { .. } => BlockKind::BulletedListItem,
            Block::NumberedListItem { .. } => BlockKind::NumberedListItem,
            Block::ChecklistItem { .. } => BlockKind::ChecklistItem,
            Block::Quote { .. } => BlockKind::Quote,
            Block::Divider => BlockKind::Divider,
            Block::Code { .. } => BlockKind::Code,
            Block::Paragraph { .. } => BlockKind::Paragraph,
        }
    }

    /// Text content, or `None` for a divider.
    ///
    /// For code blocks this is the code body.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading1 { text }
            | Block::Heading2 { text }
            | Block::Heading3 { text }
            | Block::BulletedListItem { text }
            | Block::NumberedListItem { text }
            | Block::ChecklistItem { text, .. }
            | Block::Quote { text }
            | Block::Code { text, .. }
            | Block::Paragraph { text } => Some(text),
            Block::Divider => None,
        }
    }
}

/// Discriminant of [`Block`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    ChecklistItem,
    Quote,
    Divider,
    Code,
    Paragraph,
}

impl BlockKind {
    /// Every kind, in declaration order.
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::BulletedListItem,
        BlockKind::NumberedListItem,
        BlockKind::ChecklistItem,
        BlockKind::Quote,
        BlockKind::Divider,
        BlockKind::Code,
        BlockKind::Paragraph,
    ];

    /// The snake_case name used in serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading1 => "heading1",
            BlockKind::Heading2 => "heading2",
            BlockKind::Heading3 => "heading3",
            BlockKind::BulletedListItem => "bulleted_list_item",
            BlockKind::NumberedListItem => "numbered_list_item",
            BlockKind::ChecklistItem => "checklist_item",
            BlockKind::Quote => "quote",
            BlockKind::Divider => "divider",
            BlockKind::Code => "code",
            BlockKind::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
