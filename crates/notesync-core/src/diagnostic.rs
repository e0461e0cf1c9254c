//! Non-fatal observations recorded while parsing.
//!
//! The block parser accepts every input, so nothing here is an error in the
//! `Result` sense. Diagnostics tell the caller where the output may not be
//! what the author meant.

use std::fmt;

use serde::Serialize;

/// Diagnostic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Input ended while a code fence was still open.
    UnterminatedFence,
}

/// A diagnostic with its source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// 1-based line the diagnostic points at
    pub line: usize,
    /// Diagnostic categorization
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// An open fence that was never closed.
    ///
    /// `flushed` says whether the buffered lines were still emitted.
    pub fn unterminated_fence(line: usize, language: &str, flushed: bool) -> Self {
        let outcome = if flushed {
            "kept as a code block"
        } else {
            "dropped"
        };
        Self {
            message: format!("unclosed {} code fence, buffered lines {}", language, outcome),
            line,
            kind: DiagnosticKind::UnterminatedFence,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Diagnostics collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a diagnostic to the collection.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
