//! Translation options

use crate::source::DEFAULT_DEDENT_WIDTH;

/// Options controlling a `Translator`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Number of leading spaces removed from each line while re-scanning
    /// the body of an elided `if (self) { ... }` guard
    pub dedent_width: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            dedent_width: DEFAULT_DEDENT_WIDTH,
        }
    }
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dedent_width(mut self, width: usize) -> Self {
        self.dedent_width = width;
        self
    }
}
