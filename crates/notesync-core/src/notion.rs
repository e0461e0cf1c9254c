//! Mapping from blocks and notes to Notion API request bodies.
//!
//! Everything here is a pure function returning `serde_json::Value`; sending
//! the bodies is left to a [`DocumentStore`](crate::sync::DocumentStore).
//! [`NotionApi`] pairs a body with the method and URL it belongs to.

use serde::Serialize;
use serde_json::{json, Value};

use crate::block::Block;
use crate::note::ProcessedNote;

/// API version the payloads are shaped for.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Root of the public Notion REST API.
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Longest `content` a single rich-text object may carry.
pub const MAX_RICH_TEXT_LEN: usize = 2000;

/// Most children Notion accepts in one create or append request.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

/// Tags beyond this count are left off the `Tags` property.
pub const MAX_PAGE_TAGS: usize = 5;

/// Rich-text array for plain `content`, split into segments of at most
/// [`MAX_RICH_TEXT_LEN`] characters.
pub fn rich_text(content: &str) -> Value {
    let segments: Vec<Value> = split_content(content, MAX_RICH_TEXT_LEN)
        .into_iter()
        .map(|segment| json!({"type": "text", "text": {"content": segment}}))
        .collect();
    Value::Array(segments)
}

fn split_content(content: &str, max_chars: usize) -> Vec<&str> {
    if content.is_empty() {
        return vec![""];
    }
    let mut segments = Vec::with_capacity(content.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in content.char_indices() {
        if count == max_chars {
            segments.push(&content[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    segments.push(&content[start..]);
    segments
}

/// Notion type name for a block.
pub fn notion_type(block: &Block) -> &'static str {
    match block {
        Block::Heading1 { .. } => "heading_1",
        Block::Heading2 { .. } => "heading_2",
        Block::Heading3 { .. } => "heading_3",
        Block::BulletedListItem { .. } => "bulleted_list_item",
        Block::NumberedListItem { .. } => "numbered_list_item",
        Block::ChecklistItem { .. } => "to_do",
        Block::Quote { .. } => "quote",
        Block::Divider => "divider",
        Block::Code { .. } => "code",
        Block::Paragraph { .. } => "paragraph",
    }
}

/// Map one block to its Notion block object.
pub fn to_notion_block(block: &Block) -> Value {
    let kind = notion_type(block);
    let body = match block {
        Block::ChecklistItem { checked, text } => json!({
            "rich_text": rich_text(text),
            "checked": checked,
        }),
        Block::Code { language, text } => json!({
            "language": language,
            "rich_text": rich_text(text),
        }),
        Block::Divider => json!({}),
        Block::Heading1 { text }
        | Block::Heading2 { text }
        | Block::Heading3 { text }
        | Block::BulletedListItem { text }
        | Block::NumberedListItem { text }
        | Block::Quote { text }
        | Block::Paragraph { text } => json!({ "rich_text": rich_text(text) }),
    };

    let mut object = serde_json::Map::with_capacity(3);
    object.insert("object".into(), Value::from("block"));
    object.insert("type".into(), Value::from(kind));
    object.insert(kind.into(), body);
    Value::Object(object)
}

/// Map blocks to Notion children, preserving order.
pub fn children(blocks: &[Block]) -> Vec<Value> {
    blocks.iter().map(to_notion_block).collect()
}

/// Split children into request-sized batches, preserving order.
///
/// A `max` of zero is treated as one.
pub fn chunk_children(children: Vec<Value>, max: usize) -> Vec<Vec<Value>> {
    let max = max.max(1);
    let mut batches = Vec::with_capacity(children.len().div_ceil(max));
    let mut iter = children.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(max).collect());
    }
    batches
}

/// Page properties for a note, with `name` as the page title.
pub fn page_properties(note: &ProcessedNote, name: &str) -> Value {
    let tags: Vec<Value> = note
        .tags
        .iter()
        .take(MAX_PAGE_TAGS)
        .map(|tag| json!({"name": tag}))
        .collect();

    json!({
        "Name": {"title": [{"text": {"content": name}}]},
        "Date": {"date": {"start": note.target_date.format("%Y-%m-%d").to_string()}},
        "Status": {"select": {"name": note.status.as_str()}},
        "Tags": {"multi_select": tags},
    })
}

/// Body for `POST /v1/pages`, creating a row of `database_id`.
pub fn create_page_body(database_id: &str, properties: Value, children: Vec<Value>) -> Value {
    json!({
        "parent": {"database_id": database_id},
        "properties": properties,
        "children": children,
    })
}

/// Body for `PATCH /v1/blocks/{id}/children`.
pub fn append_children_body(children: Vec<Value>) -> Value {
    json!({ "children": children })
}

/// Body for `POST /v1/databases/{id}/query` matching `Name` exactly.
pub fn title_query_body(title: &str) -> Value {
    json!({
        "filter": {
            "property": "Name",
            "title": {"equals": title},
        },
    })
}

/// One HTTP call against the Notion API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub body: Value,
}

/// Base URL and version the requests are addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionApi {
    base: String,
    version: String,
}

impl NotionApi {
    pub fn new(base: &str, version: impl Into<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            version: version.into(),
        }
    }

    /// Value for the `Notion-Version` header.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Exact-title lookup of a container page.
    pub fn query_title(&self, database_id: &str, title: &str) -> Request {
        Request {
            method: "POST",
            url: format!("{}/databases/{}/query", self.base, database_id),
            body: title_query_body(title),
        }
    }

    pub fn create_page(&self, body: Value) -> Request {
        Request {
            method: "POST",
            url: format!("{}/pages", self.base),
            body,
        }
    }

    pub fn append_children(&self, block_id: &str, body: Value) -> Request {
        Request {
            method: "PATCH",
            url: format!("{}/blocks/{}/children", self.base, block_id),
            body,
        }
    }
}

impl Default for NotionApi {
    fn default() -> Self {
        Self::new(NOTION_API_BASE, NOTION_VERSION)
    }
}

/// Request bodies needed to create a page holding `blocks`.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// Create-page body carrying the first batch of children.
    pub create: Value,
    /// Append bodies for the remaining batches, in order.
    pub appends: Vec<Value>,
}

impl PagePlan {
    /// Build the plan for a new page titled `name` in `database_id`.
    pub fn new(
        database_id: &str,
        note: &ProcessedNote,
        name: &str,
        blocks: &[Block],
        max_children: usize,
    ) -> Self {
        let mut batches = chunk_children(children(blocks), max_children).into_iter();
        let first = batches.next().unwrap_or_default();
        Self {
            create: create_page_body(database_id, page_properties(note, name), first),
            appends: batches.map(append_children_body).collect(),
        }
    }

    /// Number of HTTP requests the plan takes.
    pub fn request_count(&self) -> usize {
        1 + self.appends.len()
    }
}

/// Append bodies for adding `blocks` to an existing page.
pub fn append_plan(blocks: &[Block], max_children: usize) -> Vec<Value> {
    chunk_children(children(blocks), max_children)
        .into_iter()
        .map(append_children_body)
        .collect()
}
