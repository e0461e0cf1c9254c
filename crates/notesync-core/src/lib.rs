//! # notesync core
//!
//! Turns quick notes into Notion pages.
//!
//! The centre of the crate is a small line-oriented markdown parser that maps
//! each line of a note onto one typed [`Block`]. Around it sit the Notion
//! payload mapping, a two-step language-model pipeline that classifies and
//! formats raw input, the sync step and a local history file.
//!
//! ## Quick Start
//!
//! ```rust
//! use notesync_core::{Block, Parser};
//!
//! let blocks = Parser::new().parse(["# Groceries", "- [ ] buy milk", "- [x] eggs"]);
//!
//! assert_eq!(blocks[0], Block::heading(1, "Groceries"));
//! assert_eq!(blocks[1], Block::checklist(false, "buy milk"));
//! ```
//!
//! ## Unterminated fences
//!
//! A code fence left open at end of input is kept as a code block by
//! default. Switch to [`FencePolicy::Drop`] to discard it instead; either way
//! a diagnostic is recorded:
//!
//! ```rust
//! use notesync_core::{FencePolicy, Parser};
//!
//! let parser = Parser::new().with_fence_policy(FencePolicy::Drop);
//! let result = parser.parse_with_diagnostics(["```sh", "rm -rf build"]);
//!
//! assert!(result.blocks.is_empty());
//! assert_eq!(result.diagnostics.len(), 1);
//! ```

pub mod block;
pub mod diagnostic;
pub mod error;
pub mod history;
pub mod lexer;
pub mod note;
pub mod notion;
pub mod parser;
pub mod pipeline;
pub mod rules;
pub mod sync;

pub use block::{Block, BlockKind, UNSPECIFIED_LANGUAGE};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use history::{History, HistoryEntry};
pub use note::{ClassifiedNote, NoteCategory, NoteStatus, ProcessedNote};
pub use parser::{parse, FencePolicy, ParseResult, Parser};
pub use pipeline::{LanguageModel, NotePipeline};
pub use sync::{sync_note, DocumentStore, MemoryStore, PageRef, SyncOptions, SyncReport};
