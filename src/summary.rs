//! Summary struct - the post-processed text returned by the summarizer.

use std::fmt;

/// Plain-text summary, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
}

impl Summary {
    /// Create a new summary
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
