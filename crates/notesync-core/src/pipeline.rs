//! Two-step note pipeline: classify and format, then enrich properties.
//!
//! The language model is injected through [`LanguageModel`], so tests and
//! offline runs can script replies without any network client.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::note::{merge_tags, ClassifiedNote, NoteCategory, NoteStatus, ProcessedNote};

/// A chat-style completion backend.
pub trait LanguageModel {
    /// Complete a conversation made of one system and one user message.
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

impl<T: LanguageModel + ?Sized> LanguageModel for &T {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }
}

const ENRICH_PROMPT: &str = r#"Generate Notion-compatible status and tags.

Status rules:
- "Task" -> "To Do", "In Progress", or "Done"
- "Idea" -> "Draft", "Under Review", or "Approved"
- "Note" -> "Active" or "Archived"

Return JSON only: {"status": "...", "additional_tags": []}"#;

/// Date facts handed to the model so it can resolve words like "tomorrow".
pub fn date_context(now: NaiveDateTime) -> String {
    format!(
        "Current Date Context:
- Today: {} ({})
- Current Time: {}
- Week Number: {}
- Year: {}",
        now.format("%Y-%m-%d"),
        now.format("%A"),
        now.format("%H:%M"),
        now.format("%W"),
        now.format("%Y"),
    )
}

fn format_prompt(now: NaiveDateTime) -> String {
    format!(
        r#"You are a smart assistant for classifying notes and extracting dates.
{}

Your Tasks:
1. Classify input as: "Note", "Idea", or "Task"
2. Extract/Generate a short Title.
3. **EXTRACT TARGET DATE (Crucial):**
   - Format: YYYY-MM-DD
   - Default: Today's date.
4. **FORMAT CONTENT (Crucial):**
   - **IF TASK:** Format as CHECKLIST `- [ ]`. Remove time words like "tomorrow". Start with Verb.
   - **IF NOTE/IDEA:** Standard Markdown.
5. Extract tags.

Output JSON only:
{{
    "category": "Note|Idea|Task",
    "title": "Title",
    "target_date": "YYYY-MM-DD",
    "formatted_content": "Markdown...",
    "tags": ["tag1"]
}}"#,
        date_context(now)
    )
}

/// Strip a markdown code fence the model may have wrapped its JSON in.
///
/// Takes the text between the first fence and the next one, dropping a
/// leading `json` language tag. Unfenced replies are only trimmed.
pub fn strip_json_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let body = &trimmed[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

#[derive(Debug, Deserialize)]
struct FormatReply {
    category: String,
    title: String,
    #[serde(default)]
    target_date: Option<String>,
    formatted_content: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EnrichReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    additional_tags: Vec<String>,
}

/// Classifies free text into a [`ProcessedNote`] with an injected model.
#[derive(Debug, Clone)]
pub struct NotePipeline<M> {
    model: M,
}

impl<M: LanguageModel> NotePipeline<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Run both steps. `now` anchors relative dates in the input.
    pub fn process(&self, text: &str, now: NaiveDateTime) -> Result<ProcessedNote> {
        let classified = self.format(text, now)?;
        Ok(self.enrich(classified))
    }

    /// Step one: classify, title, date and format the input.
    ///
    /// Fails if the model errors or replies with something unusable.
    pub fn format(&self, text: &str, now: NaiveDateTime) -> Result<ClassifiedNote> {
        let reply = self
            .model
            .complete(&format_prompt(now), &format!("Input: {}", text))?;
        let parsed: FormatReply = serde_json::from_str(strip_json_fence(&reply))
            .map_err(|e| Error::malformed("format", e.to_string()))?;

        let category: NoteCategory = parsed
            .category
            .parse()
            .map_err(|reason: String| Error::malformed("format", reason))?;

        let today = now.date();
        let target_date = match parsed.target_date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
                log::warn!("model returned unusable target date '{}', using today", raw);
                today
            }),
        };

        log::debug!("classified input as {} '{}'", category, parsed.title);

        Ok(ClassifiedNote {
            category,
            title: parsed.title,
            target_date,
            formatted_content: parsed.formatted_content,
            tags: parsed.tags,
        })
    }

    /// Step two: pick a status and extra tags. Never fails; on any problem
    /// the note keeps its own tags and gets [`NoteStatus::Active`]. A reply
    /// without a status also means `Active`; any other name is kept.
    pub fn enrich(&self, note: ClassifiedNote) -> ProcessedNote {
        match self.request_enrichment(&note) {
            Ok(reply) => {
                let status = reply
                    .status
                    .as_deref()
                    .and_then(NoteStatus::from_name)
                    .unwrap_or_default();
                let extra = reply
                    .additional_tags
                    .into_iter()
                    .chain(std::iter::once(note.category.to_string()));
                let tags = merge_tags(&note.tags, extra);
                ProcessedNote::from_classified(note, status, tags)
            }
            Err(e) => {
                log::warn!("enrichment failed, falling back to defaults: {}", e);
                let tags = note.tags.clone();
                ProcessedNote::from_classified(note, NoteStatus::Active, tags)
            }
        }
    }

    fn request_enrichment(&self, note: &ClassifiedNote) -> Result<EnrichReply> {
        let user = format!(
            "Category: {}\nTitle: {}\nTarget Date: {}\nTags: {:?}",
            note.category,
            note.title,
            note.target_date.format("%Y-%m-%d"),
            note.tags
        );
        let reply = self.model.complete(ENRICH_PROMPT, &user)?;
        serde_json::from_str(strip_json_fence(&reply))
            .map_err(|e| Error::malformed("enrich", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("{\"a\":1}", "{\"a\":1}")]
    #[case("```json\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("```\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("Sure!\n```json\n{\"a\":1}\n```\nDone.", "{\"a\":1}")]
    #[case("```json\n{\"a\":1}", "{\"a\":1}")]
    fn strips_fences(#[case] reply: &str, #[case] expected: &str) {
        assert_eq!(strip_json_fence(reply), expected);
    }

    #[test]
    fn date_context_lists_today() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let context = date_context(now);
        assert!(context.contains("- Today: 2024-01-15 (Monday)"));
        assert!(context.contains("- Current Time: 09:30"));
        assert!(context.contains("- Year: 2024"));
    }
}
