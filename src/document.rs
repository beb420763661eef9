//! Document struct - the extracted content handed to the summarizer.

use std::time::Duration;
use url::Url;

/// Source metadata collected alongside the text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Page title or video title
    pub title: Option<String>,
    /// Channel name for videos
    pub author: Option<String>,
    /// Video length
    pub duration: Option<Duration>,
    pub view_count: Option<u64>,
    /// Publish date as reported by the source (e.g. `2009-10-25`)
    pub publish_date: Option<String>,
    /// Caption language code for transcripts
    pub language: Option<String>,
}

/// Extracted plain text plus metadata, produced from a single URL fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The URL the content came from
    pub source: Url,
    /// Extracted text; may be empty
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    /// Create a new document
    pub fn new(source: Url, text: String, metadata: Metadata) -> Self {
        Self {
            source,
            text,
            metadata,
        }
    }

    /// Title if known, otherwise the source URL
    pub fn display_title(&self) -> &str {
        self.metadata
            .title
            .as_deref()
            .unwrap_or_else(|| self.source.as_str())
    }

    /// Number of characters of extracted text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Format a duration as `h:mm:ss` or `m:ss`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
