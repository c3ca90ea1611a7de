//! Line source with one line of lookahead
//!
//! Wraps any iterator of lines. Lines are right-trimmed when fetched, and
//! while de-indent mode is active one indentation unit is removed from the
//! front of each freshly fetched line.

use tracing::trace;

/// Default width of the indentation unit removed in de-indent mode
pub const DEFAULT_DEDENT_WIDTH: usize = 4;

/// A pull-based line reader supporting `peek` without consuming.
///
/// Invariant: the lookahead buffer is either empty or holds exactly one line
/// that has been fetched but not yet consumed.
pub struct LineSource<I> {
    lines: I,
    lookahead: Option<String>,
    dedent: bool,
    dedent_unit: String,
    fetched: u32,
}

impl<I: Iterator<Item = String>> LineSource<I> {
    pub fn new(lines: I) -> Self {
        Self::with_dedent_width(lines, DEFAULT_DEDENT_WIDTH)
    }

    pub fn with_dedent_width(lines: I, width: usize) -> Self {
        LineSource {
            lines,
            lookahead: None,
            dedent: false,
            dedent_unit: " ".repeat(width),
            fetched: 0,
        }
    }

    /// Return the next line without consuming it. Repeated calls return the
    /// same line until `next_line` is called. `None` means end of input.
    pub fn peek(&mut self) -> Option<&str> {
        if self.lookahead.is_none() {
            self.lookahead = self.fetch();
        }
        self.lookahead.as_deref()
    }

    /// Consume and return the next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Option<String> {
        match self.lookahead.take() {
            Some(line) => Some(line),
            None => self.fetch(),
        }
    }

    /// 1-based number of the most recently consumed line (0 before the first).
    pub fn line_number(&self) -> u32 {
        self.fetched - u32::from(self.lookahead.is_some())
    }

    /// Switch de-indent mode, returning the previous setting.
    ///
    /// Only affects lines fetched afterwards; a line already sitting in the
    /// lookahead buffer is returned as it was fetched.
    pub fn set_dedent(&mut self, on: bool) -> bool {
        std::mem::replace(&mut self.dedent, on)
    }

    pub fn is_dedenting(&self) -> bool {
        self.dedent
    }

    fn fetch(&mut self) -> Option<String> {
        let mut line = self.lines.next()?;
        self.fetched += 1;

        line.truncate(line.trim_end().len());
        if self.dedent && !self.dedent_unit.is_empty() && line.starts_with(&self.dedent_unit) {
            line.drain(..self.dedent_unit.len());
        }

        trace!(line = self.fetched, text = %line, "read");
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> LineSource<std::vec::IntoIter<String>> {
        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        LineSource::new(lines.into_iter())
    }

    #[test]
    fn test_peek_is_idempotent() {
        let mut src = source("one\ntwo");
        assert_eq!(src.peek(), Some("one"));
        assert_eq!(src.peek(), Some("one"));
        assert_eq!(src.next_line().as_deref(), Some("one"));
        assert_eq!(src.next_line().as_deref(), Some("two"));
        assert_eq!(src.peek(), None);
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn test_lines_are_right_trimmed() {
        let mut src = source("x = 1;   \r");
        assert_eq!(src.next_line().as_deref(), Some("x = 1;"));
    }

    #[test]
    fn test_line_number_ignores_lookahead() {
        let mut src = source("a\nb\nc");
        assert_eq!(src.line_number(), 0);
        src.next_line();
        assert_eq!(src.line_number(), 1);
        src.peek();
        assert_eq!(src.line_number(), 1);
        src.next_line();
        assert_eq!(src.line_number(), 2);
    }

    #[test]
    fn test_dedent_applies_to_fresh_lines_only() {
        let mut src = source("        a\n        b\n  c");
        src.peek();
        assert!(!src.set_dedent(true));
        // Buffered before activation: unchanged
        assert_eq!(src.next_line().as_deref(), Some("        a"));
        assert_eq!(src.next_line().as_deref(), Some("    b"));
        // Shorter indentation than one unit is left alone
        assert_eq!(src.next_line().as_deref(), Some("  c"));
        assert!(src.set_dedent(false));
        assert!(!src.is_dedenting());
    }
}
