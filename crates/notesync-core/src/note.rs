//! Note categories, statuses and the processed-note record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What kind of note the input turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteCategory {
    Note,
    Idea,
    Task,
}

impl NoteCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            NoteCategory::Note => "Note",
            NoteCategory::Idea => "Idea",
            NoteCategory::Task => "Task",
        }
    }

    /// Title of the shared page this category collects into, if any.
    ///
    /// Ideas get a page of their own.
    pub fn container_title(self, date: NaiveDate) -> Option<String> {
        let date = date.format("%Y-%m-%d");
        match self {
            NoteCategory::Note => Some(format!("Daily Note - {}", date)),
            NoteCategory::Task => Some(format!("Tasks - {}", date)),
            NoteCategory::Idea => None,
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "note" => Ok(NoteCategory::Note),
            "idea" => Ok(NoteCategory::Idea),
            "task" => Ok(NoteCategory::Task),
            other => Err(format!("unknown note category '{}'", other)),
        }
    }
}

/// Workflow status shown in the Notion `Status` select.
///
/// The model may answer with any select option, so names outside the
/// well-known ones are carried through unchanged in [`NoteStatus::Custom`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteStatus {
    #[default]
    Active,
    ToDo,
    Draft,
    Custom(String),
}

impl NoteStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NoteStatus::Active => "Active",
            NoteStatus::ToDo => "To Do",
            NoteStatus::Draft => "Draft",
            NoteStatus::Custom(name) => name,
        }
    }

    /// Map a status name onto a variant. Blank names are `None`.
    ///
    /// Well-known names match loosely (`"todo"`, `"to-do"`); anything else
    /// is kept verbatim apart from surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let normalized: String = name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        let status = match normalized.as_str() {
            "active" => NoteStatus::Active,
            "todo" => NoteStatus::ToDo,
            "draft" => NoteStatus::Draft,
            _ => NoteStatus::Custom(name.to_string()),
        };
        Some(status)
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteStatus::from_name(s).ok_or_else(|| "note status is empty".to_string())
    }
}

impl From<String> for NoteStatus {
    fn from(name: String) -> Self {
        NoteStatus::from_name(&name).unwrap_or_default()
    }
}

impl From<NoteStatus> for String {
    fn from(status: NoteStatus) -> Self {
        match status {
            NoteStatus::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Output of the format step: classification plus markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedNote {
    pub category: NoteCategory,
    pub title: String,
    pub target_date: NaiveDate,
    /// Markdown body, fed to the block parser at sync time.
    pub formatted_content: String,
    pub tags: Vec<String>,
}

/// A fully processed note, ready to sync and to store in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedNote {
    pub category: NoteCategory,
    pub title: String,
    pub target_date: NaiveDate,
    pub formatted_content: String,
    pub status: NoteStatus,
    pub tags: Vec<String>,
}

impl ProcessedNote {
    /// Promote a classified note with the given status and tags.
    pub fn from_classified(note: ClassifiedNote, status: NoteStatus, tags: Vec<String>) -> Self {
        Self {
            category: note.category,
            title: note.title,
            target_date: note.target_date,
            formatted_content: note.formatted_content,
            status,
            tags,
        }
    }
}

/// Append `extra` to `tags`, skipping exact duplicates and keeping
/// first-seen order.
pub fn merge_tags<I, S>(tags: &[String], extra: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut merged: Vec<String> = Vec::with_capacity(tags.len() + 4);
    let candidates = tags.iter().cloned().chain(extra.into_iter().map(Into::into));
    for tag in candidates {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    merged
}
