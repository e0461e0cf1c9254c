//! Single-pass markdown block parser.
//!
//! Each line either toggles a code fence, is absorbed into the open code
//! block, or is classified by the first matching rule in
//! [`LINE_RULES`](crate::rules::LINE_RULES). Parse state lives on the stack
//! of one call, so a [`Parser`] can be shared freely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::{Block, UNSPECIFIED_LANGUAGE};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::lexer::Lexer;
use crate::rules;

/// What to do with a code fence that is still open at end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FencePolicy {
    /// Emit the buffered lines as a code block.
    #[default]
    Flush,
    /// Discard the buffered lines.
    Drop,
}

impl FencePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            FencePolicy::Flush => "flush",
            FencePolicy::Drop => "drop",
        }
    }
}

impl fmt::Display for FencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flush" => Ok(FencePolicy::Flush),
            "drop" => Ok(FencePolicy::Drop),
            other => Err(format!(
                "unknown fence policy '{}', expected 'flush' or 'drop'",
                other
            )),
        }
    }
}

/// Blocks plus the diagnostics recorded while producing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Blocks in input order.
    pub blocks: Vec<Block>,
    /// Non-fatal observations.
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    /// Check if parsing recorded no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Markdown block parser with a configurable end-of-input fence policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    fence_policy: FencePolicy,
}

/// Transient state of one parse call.
#[derive(Debug, Default)]
struct ParseState {
    in_code_block: bool,
    code_language: String,
    code_buffer: Vec<String>,
    /// Line number of the fence that opened the current code block.
    fence_line: usize,
}

impl ParseState {
    fn open_fence(&mut self, info: &str, line: usize) {
        self.in_code_block = true;
        self.code_language = if info.is_empty() {
            UNSPECIFIED_LANGUAGE.to_string()
        } else {
            info.to_string()
        };
        self.code_buffer.clear();
        self.fence_line = line;
    }

    fn close_fence(&mut self) -> Block {
        self.in_code_block = false;
        let text = self.code_buffer.join("\n");
        self.code_buffer.clear();
        Block::Code {
            language: std::mem::take(&mut self.code_language),
            text,
        }
    }
}

impl Parser {
    /// Create a parser with the default [`FencePolicy::Flush`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose what happens to an unterminated code fence.
    pub fn with_fence_policy(mut self, policy: FencePolicy) -> Self {
        self.fence_policy = policy;
        self
    }

    /// The configured fence policy.
    pub fn fence_policy(&self) -> FencePolicy {
        self.fence_policy
    }

    /// Parse a sequence of lines into blocks.
    #[inline]
    pub fn parse<I, S>(&self, lines: I) -> Vec<Block>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parse_with_diagnostics(lines).blocks
    }

    /// Parse a whole text, splitting it into lines first.
    #[inline]
    pub fn parse_str(&self, input: &str) -> Vec<Block> {
        self.parse_str_with_diagnostics(input).blocks
    }

    /// Like [`Parser::parse_str`], also returning diagnostics.
    pub fn parse_str_with_diagnostics(&self, input: &str) -> ParseResult {
        self.parse_with_diagnostics(Lexer::new(input).map(|line| line.text))
    }

    /// Parse a sequence of lines, returning blocks and diagnostics.
    pub fn parse_with_diagnostics<I, S>(&self, lines: I) -> ParseResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = ParseState::default();
        let mut blocks = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let mut line_count = 0;

        for (idx, raw) in lines.into_iter().enumerate() {
            line_count = idx + 1;
            let line = raw.as_ref().trim_end();

            if let Some(info) = rules::fence_info(line) {
                if state.in_code_block {
                    blocks.push(state.close_fence());
                } else {
                    state.open_fence(&info, line_count);
                }
                continue;
            }

            if state.in_code_block {
                state.code_buffer.push(line.to_string());
                continue;
            }

            if let Some(block) = rules::classify(line) {
                blocks.push(block);
            }
        }

        if state.in_code_block {
            let flushed = self.fence_policy == FencePolicy::Flush;
            let diagnostic =
                Diagnostic::unterminated_fence(state.fence_line, &state.code_language, flushed);
            log::warn!("{}", diagnostic);
            diagnostics.push(diagnostic);
            if flushed {
                blocks.push(state.close_fence());
            }
        }

        log::debug!(
            "parsed {} lines into {} blocks ({} diagnostics)",
            line_count,
            blocks.len(),
            diagnostics.len()
        );

        ParseResult {
            blocks,
            diagnostics,
        }
    }
}

/// Parse lines with the default parser.
pub fn parse<I, S>(lines: I) -> Vec<Block>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Parser::new().parse(lines)
}
