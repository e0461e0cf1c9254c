//! Integration tests for the note pipeline and Notion sync

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::{NaiveDate, NaiveDateTime};
use notesync_core::sync::SyncAction;
use notesync_core::{
    sync_note, DocumentStore, Error, LanguageModel, MemoryStore, NoteCategory, NotePipeline,
    NoteStatus, ProcessedNote, Result, SyncOptions,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

/// Replays canned replies in order and remembers the prompts it saw.
#[derive(Default)]
struct ScriptedModel {
    replies: RefCell<VecDeque<Result<String>>>,
    prompts: RefCell<Vec<(String, String)>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            prompts: RefCell::default(),
        }
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.prompts
            .borrow_mut()
            .push((system.to_string(), user.to_string()));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Model("no scripted reply left".into())))
    }
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(18, 5, 0)
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const TASK_REPLY: &str = r#"```json
{
  "category": "Task",
  "title": "Buy groceries",
  "target_date": "2024-06-04",
  "formatted_content": "- [ ] Buy milk\n- [ ] Buy eggs",
  "tags": ["shopping"]
}
```"#;

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_process_task_with_enrichment() {
    let model = ScriptedModel::new(vec![
        Ok(TASK_REPLY.to_string()),
        Ok(r#"{"status": "To Do", "additional_tags": ["errands", "shopping"]}"#.to_string()),
    ]);
    let pipeline = NotePipeline::new(&model);

    let note = pipeline
        .process("buy milk and eggs tomorrow", now())
        .unwrap();

    assert_eq!(
        note,
        ProcessedNote {
            category: NoteCategory::Task,
            title: "Buy groceries".into(),
            target_date: date(2024, 6, 4),
            formatted_content: "- [ ] Buy milk\n- [ ] Buy eggs".into(),
            status: NoteStatus::ToDo,
            tags: vec!["shopping".into(), "errands".into(), "Task".into()],
        }
    );

    let prompts = model.prompts.borrow();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].0.contains("- Today: 2024-06-03 (Monday)"));
    assert_eq!(prompts[0].1, "Input: buy milk and eggs tomorrow");
    assert!(prompts[1].1.contains("Category: Task"));
}

#[test]
fn test_enrichment_failure_falls_back() {
    let model = ScriptedModel::new(vec![
        Ok(TASK_REPLY.to_string()),
        Ok("I cannot answer that".to_string()),
    ]);
    let note = NotePipeline::new(&model).process("x", now()).unwrap();

    assert_eq!(note.status, NoteStatus::Active);
    assert_eq!(note.tags, vec!["shopping".to_string()]);
}

#[test]
fn test_enrichment_model_error_falls_back() {
    let model = ScriptedModel::new(vec![
        Ok(TASK_REPLY.to_string()),
        Err(Error::Model("rate limited".into())),
    ]);
    let note = NotePipeline::new(&model).process("x", now()).unwrap();
    assert_eq!(note.status, NoteStatus::Active);
}

#[test]
fn test_missing_date_and_tags_default() {
    let model = ScriptedModel::new(vec![
        Ok(r#"{"category": "idea", "title": "App", "formatted_content": "An app"}"#.to_string()),
        Ok(r#"{"additional_tags": []}"#.to_string()),
    ]);
    let note = NotePipeline::new(&model).process("app idea", now()).unwrap();

    assert_eq!(note.category, NoteCategory::Idea);
    assert_eq!(note.target_date, date(2024, 6, 3));
    assert_eq!(note.status, NoteStatus::Active);
    assert_eq!(note.tags, vec!["Idea".to_string()]);
}

#[test]
fn test_status_outside_known_names_is_kept() {
    let model = ScriptedModel::new(vec![
        Ok(TASK_REPLY.to_string()),
        Ok(r#"{"status": "Done", "additional_tags": []}"#.to_string()),
    ]);
    let note = NotePipeline::new(&model).process("x", now()).unwrap();

    assert_eq!(note.status, NoteStatus::Custom("Done".into()));
    assert_eq!(note.status.as_str(), "Done");
}

#[test]
fn test_blank_status_means_active() {
    let model = ScriptedModel::new(vec![
        Ok(TASK_REPLY.to_string()),
        Ok(r#"{"status": "  ", "additional_tags": []}"#.to_string()),
    ]);
    let note = NotePipeline::new(&model).process("x", now()).unwrap();
    assert_eq!(note.status, NoteStatus::Active);
}

#[test]
fn test_unparseable_date_uses_today() {
    let model = ScriptedModel::new(vec![Ok(
        r#"{"category": "Note", "title": "t", "target_date": "next week", "formatted_content": "c"}"#
            .to_string(),
    )]);
    let classified = NotePipeline::new(&model).format("t", now()).unwrap();
    assert_eq!(classified.target_date, date(2024, 6, 3));
}

#[test]
fn test_format_errors_abort() {
    let garbage = ScriptedModel::new(vec![Ok("not json at all".to_string())]);
    let err = NotePipeline::new(&garbage).process("x", now()).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { step: "format", .. }));

    let bad_category = ScriptedModel::new(vec![Ok(
        r#"{"category": "Reminder", "title": "t", "formatted_content": "c"}"#.to_string(),
    )]);
    let err = NotePipeline::new(&bad_category).process("x", now()).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));

    let offline = ScriptedModel::new(vec![Err(Error::Model("offline".into()))]);
    let err = NotePipeline::new(&offline).process("x", now()).unwrap_err();
    assert!(matches!(err, Error::Model(_)));
}

// ============================================================================
// Sync
// ============================================================================

fn processed(category: NoteCategory, content: &str) -> ProcessedNote {
    ProcessedNote {
        category,
        title: "Launch idea".into(),
        target_date: date(2024, 6, 4),
        formatted_content: content.into(),
        status: NoteStatus::Active,
        tags: vec!["work".into()],
    }
}

fn child_types(children: &[Value]) -> Vec<&str> {
    children
        .iter()
        .map(|c| c["type"].as_str().unwrap())
        .collect()
}

#[test]
fn test_idea_creates_its_own_page() {
    let store = MemoryStore::new();
    let note = processed(NoteCategory::Idea, "# Launch\n- landing page\n---\n> go");
    let report = sync_note(&store, &note, &SyncOptions::new("parent")).unwrap();

    assert_eq!(report.action, SyncAction::Created);
    assert_eq!(report.blocks, 4);
    assert_eq!(report.requests, 1);

    let pages = store.pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "Launch idea");
    assert_eq!(pages[0].database_id, "parent");
    assert_eq!(
        child_types(&pages[0].children),
        vec!["heading_1", "bulleted_list_item", "divider", "quote"]
    );
}

#[test]
fn test_tasks_collect_into_one_daily_page() {
    let store = MemoryStore::new();
    let options = SyncOptions::new("parent");

    let first = sync_note(&store, &processed(NoteCategory::Task, "- [ ] a"), &options).unwrap();
    let second = sync_note(&store, &processed(NoteCategory::Task, "- [x] b"), &options).unwrap();

    assert_eq!(first.action, SyncAction::Created);
    assert_eq!(second.action, SyncAction::Appended);
    assert_eq!(first.page, second.page);

    let pages = store.pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "Tasks - 2024-06-04");
    assert_eq!(pages[0].children.len(), 2);
    assert_eq!(pages[0].children[1]["to_do"]["checked"], true);
}

#[test]
fn test_container_lookup_is_scoped_to_database() {
    let store = MemoryStore::new();
    let note = processed(NoteCategory::Task, "- [ ] a");

    sync_note(&store, &note, &SyncOptions::new("db-home")).unwrap();
    let other = sync_note(&store, &note, &SyncOptions::new("db-work")).unwrap();

    assert_eq!(other.action, SyncAction::Created);
    let pages = store.pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].database_id, "db-work");
    assert_eq!(pages[1].title, pages[0].title);
}

#[test]
fn test_lookup_needs_exact_title() {
    let store = MemoryStore::new();
    let options = SyncOptions::new("db");
    sync_note(&store, &processed(NoteCategory::Task, "- [ ] a"), &options).unwrap();

    assert!(store.find_page("db", "Tasks - 2024-06-04").unwrap().is_some());
    assert!(store.find_page("db", "Tasks - 2024-06").unwrap().is_none());
    assert!(store.find_page("db", "tasks - 2024-06-04").unwrap().is_none());
}

#[test]
fn test_create_without_database_is_rejected() {
    let store = MemoryStore::new();
    let err = sync_note(&store, &processed(NoteCategory::Idea, "x"), &SyncOptions::new(""))
        .unwrap_err();
    assert!(matches!(err, Error::Store { status: 400, .. }));
}

#[test]
fn test_notes_use_daily_note_page() {
    let store = MemoryStore::new();
    let report = sync_note(
        &store,
        &processed(NoteCategory::Note, "met Sam"),
        &SyncOptions::new("parent"),
    )
    .unwrap();
    assert_eq!(report.page.title, "Daily Note - 2024-06-04");
}

#[test]
fn test_large_note_is_batched_in_order() {
    let content: Vec<String> = (0..7).map(|i| format!("{}. step", i + 1)).collect();
    let note = processed(NoteCategory::Idea, &content.join("\n"));
    let options = SyncOptions {
        max_children_per_request: 3,
        ..SyncOptions::new("parent")
    };

    let store = MemoryStore::new();
    let report = sync_note(&store, &note, &options).unwrap();

    assert_eq!(report.requests, 3);
    assert_eq!(store.request_count(), 3);
    let children = &store.pages()[0].children;
    assert_eq!(children.len(), 7);
    assert_eq!(children[6]["type"], "numbered_list_item");
}

#[test]
fn test_unterminated_fence_reported_in_sync() {
    let store = MemoryStore::new();
    let note = processed(NoteCategory::Idea, "```rust\nfn main() {}");
    let report = sync_note(&store, &note, &SyncOptions::new("parent")).unwrap();
    assert_eq!(report.blocks, 1);
    assert_eq!(report.diagnostics.len(), 1);
}

/// Store that rejects every write.
struct RejectingStore;

impl DocumentStore for RejectingStore {
    fn find_page(
        &self,
        _database_id: &str,
        _title: &str,
    ) -> Result<Option<notesync_core::PageRef>> {
        Ok(None)
    }

    fn create_page(&self, _body: &Value) -> Result<notesync_core::PageRef> {
        Err(Error::Store {
            status: 401,
            message: "API token is invalid.".into(),
        })
    }

    fn append_children(&self, _page_id: &str, _body: &Value) -> Result<()> {
        unreachable!("nothing to append to")
    }
}

#[test]
fn test_store_failure_is_fatal() {
    let note = processed(NoteCategory::Idea, "text");
    let err = sync_note(&RejectingStore, &note, &SyncOptions::new("parent")).unwrap_err();
    assert!(matches!(err, Error::Store { status: 401, .. }));
}
