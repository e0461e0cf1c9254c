//! Local history of processed notes, one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::note::{NoteCategory, NoteStatus, ProcessedNote};

/// One recorded note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub title: String,
    pub category: NoteCategory,
    pub status: NoteStatus,
    pub target_date: NaiveDate,
    pub tags: Vec<String>,
    /// The formatted markdown body.
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_page_id: Option<String>,
}

/// Append-only JSON-lines history file.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(line).map_err(|source| Error::History {
                path: self.path.clone(),
                line: idx + 1,
                source,
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Entries newest first, at most `limit` of them.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.load()?;
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Append `note` and return the stored entry.
    pub fn record(
        &self,
        note: &ProcessedNote,
        notion_page_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<HistoryEntry> {
        let next_id = self.load()?.last().map_or(1, |entry| entry.id + 1);
        let entry = HistoryEntry {
            id: next_id,
            title: note.title.clone(),
            category: note.category,
            status: note.status.clone(),
            target_date: note.target_date,
            tags: note.tags.clone(),
            content: note.formatted_content.clone(),
            created_at,
            notion_page_id: notion_page_id.map(str::to_string),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;

        log::debug!("recorded history entry {} in {}", entry.id, self.path.display());
        Ok(entry)
    }
}
