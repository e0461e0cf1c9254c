//! Pushing processed notes into a document store.
//!
//! [`sync_note`] decides where a note goes (shared daily page or a page of
//! its own), converts its markdown into blocks and issues the requests in
//! order through a caller-supplied [`DocumentStore`].

use std::cell::RefCell;

use serde::Serialize;
use serde_json::Value;

use crate::diagnostic::Diagnostics;
use crate::error::{Error, Result};
use crate::note::ProcessedNote;
use crate::notion::{self, PagePlan, MAX_CHILDREN_PER_REQUEST};
use crate::parser::{FencePolicy, Parser};

/// A page known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub id: String,
    pub title: String,
}

/// Remote document API. Implementations own transport and authentication.
pub trait DocumentStore {
    /// Look up a page in `database_id` whose `Name` equals `title` exactly.
    fn find_page(&self, database_id: &str, title: &str) -> Result<Option<PageRef>>;

    /// Create a page from a create-page body.
    fn create_page(&self, body: &Value) -> Result<PageRef>;

    /// Append children to an existing page from an append body.
    fn append_children(&self, page_id: &str, body: &Value) -> Result<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn find_page(&self, database_id: &str, title: &str) -> Result<Option<PageRef>> {
        (**self).find_page(database_id, title)
    }

    fn create_page(&self, body: &Value) -> Result<PageRef> {
        (**self).create_page(body)
    }

    fn append_children(&self, page_id: &str, body: &Value) -> Result<()> {
        (**self).append_children(page_id, body)
    }
}

/// Knobs for one sync.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Database new pages are created in and containers are looked up in.
    pub database_id: String,
    /// Batch size for children.
    pub max_children_per_request: usize,
    /// Policy for an unterminated fence in the note body.
    pub fence_policy: FencePolicy,
}

impl SyncOptions {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            max_children_per_request: MAX_CHILDREN_PER_REQUEST,
            fence_policy: FencePolicy::default(),
        }
    }
}

/// Whether a sync made a new page or extended one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Appended,
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub page: PageRef,
    pub action: SyncAction,
    /// Blocks sent.
    pub blocks: usize,
    /// Requests issued, lookups excluded.
    pub requests: usize,
    pub diagnostics: Diagnostics,
}

/// Sync `note` into `store`. The first failing request aborts the sync.
pub fn sync_note<S>(store: &S, note: &ProcessedNote, options: &SyncOptions) -> Result<SyncReport>
where
    S: DocumentStore + ?Sized,
{
    let parsed = Parser::new()
        .with_fence_policy(options.fence_policy)
        .parse_str_with_diagnostics(&note.formatted_content);
    let blocks = parsed.blocks;

    let container = note.category.container_title(note.target_date);
    let existing = match container.as_deref() {
        Some(title) => store.find_page(&options.database_id, title)?,
        None => None,
    };

    if let Some(page) = existing {
        let bodies = notion::append_plan(&blocks, options.max_children_per_request);
        for body in &bodies {
            store.append_children(&page.id, body)?;
        }
        log::info!(
            "appended {} blocks to '{}' in {} requests",
            blocks.len(),
            page.title,
            bodies.len()
        );
        return Ok(SyncReport {
            page,
            action: SyncAction::Appended,
            blocks: blocks.len(),
            requests: bodies.len(),
            diagnostics: parsed.diagnostics,
        });
    }

    let name = container.unwrap_or_else(|| note.title.clone());
    let plan = PagePlan::new(
        &options.database_id,
        note,
        &name,
        &blocks,
        options.max_children_per_request,
    );
    let page = store.create_page(&plan.create)?;
    for body in &plan.appends {
        store.append_children(&page.id, body)?;
    }
    log::info!(
        "created '{}' with {} blocks in {} requests",
        page.title,
        blocks.len(),
        plan.request_count()
    );

    Ok(SyncReport {
        page,
        action: SyncAction::Created,
        blocks: blocks.len(),
        requests: plan.request_count(),
        diagnostics: parsed.diagnostics,
    })
}

/// A page held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub id: String,
    pub title: String,
    pub database_id: String,
    pub properties: Value,
    pub children: Vec<Value>,
}

/// In-process [`DocumentStore`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RefCell<Vec<StoredPage>>,
    requests: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all pages in creation order.
    pub fn pages(&self) -> Vec<StoredPage> {
        self.pages.borrow().clone()
    }

    /// Create and append requests handled so far.
    pub fn request_count(&self) -> usize {
        *self.requests.borrow()
    }
}

fn children_of(body: &Value) -> Result<Vec<Value>> {
    match body.get("children") {
        Some(Value::Array(items)) => Ok(items.clone()),
        _ => Err(Error::Store {
            status: 400,
            message: "body.children should be an array".into(),
        }),
    }
}

impl DocumentStore for MemoryStore {
    fn find_page(&self, database_id: &str, title: &str) -> Result<Option<PageRef>> {
        Ok(self
            .pages
            .borrow()
            .iter()
            .find(|page| page.database_id == database_id && page.title == title)
            .map(|page| PageRef {
                id: page.id.clone(),
                title: page.title.clone(),
            }))
    }

    fn create_page(&self, body: &Value) -> Result<PageRef> {
        let title = body
            .pointer("/properties/Name/title/0/text/content")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Store {
                status: 400,
                message: "body.properties.Name.title should be defined".into(),
            })?
            .to_string();
        let database_id = body
            .pointer("/parent/database_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Store {
                status: 400,
                message: "body.parent.database_id should be defined".into(),
            })?
            .to_string();
        let children = children_of(body)?;

        let mut pages = self.pages.borrow_mut();
        let id = format!("page-{}", pages.len() + 1);
        pages.push(StoredPage {
            id: id.clone(),
            title: title.clone(),
            database_id,
            properties: body["properties"].clone(),
            children,
        });
        *self.requests.borrow_mut() += 1;
        Ok(PageRef { id, title })
    }

    fn append_children(&self, page_id: &str, body: &Value) -> Result<()> {
        let children = children_of(body)?;
        let mut pages = self.pages.borrow_mut();
        let page = pages
            .iter_mut()
            .find(|page| page.id == page_id)
            .ok_or_else(|| Error::Store {
                status: 404,
                message: format!("could not find block with ID: {}", page_id),
            })?;
        page.children.extend(children);
        *self.requests.borrow_mut() += 1;
        Ok(())
    }
}
