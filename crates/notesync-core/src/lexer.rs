//! Line splitting for free-text input.
//!
//! Notes arrive either as a ready-made list of lines or as one blob of text
//! (typed input, a voice transcript, a file). The lexer turns the blob into
//! lines for the block parser.
//!
//! # Performance
//!
//! - Zero-copy: lines borrow directly from input
//! - SIMD-accelerated newline scanning via `memchr`

use memchr::memchr2;

/// A single line from the input with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text (without the line terminator).
    pub text: &'a str,
    /// 1-based line number.
    pub number: usize,
}

/// Iterator over the lines of a text.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. A trailing terminator does
/// not produce a final empty line, and empty input produces no lines.
pub struct Lexer<'a> {
    /// The complete input text.
    input: &'a str,
    /// Current byte offset.
    offset: usize,
    /// Number of lines handed out so far.
    line_count: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line_count: 0,
        }
    }

    /// Check if all input has been consumed.
    #[inline(always)]
    fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Read the next line from input.
    #[inline(always)]
    fn read_line(&mut self) -> Option<Line<'a>> {
        if self.is_eof() {
            return None;
        }

        let bytes = self.input.as_bytes();
        let start = self.offset;

        let (end, next) = match memchr2(b'\n', b'\r', &bytes[start..]) {
            Some(pos) => {
                let end = start + pos;
                // CRLF is one terminator
                let width = if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                (end, end + width)
            }
            None => (bytes.len(), bytes.len()),
        };

        self.offset = next;
        self.line_count += 1;

        // The cut point sits before an ASCII byte, so it is a char boundary.
        Some(Line {
            text: &self.input[start..end],
            number: self.line_count,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.read_line()
    }
}

/// Split `input` into borrowed line slices.
pub fn lines(input: &str) -> impl Iterator<Item = &str> {
    Lexer::new(input).map(|line| line.text)
}
