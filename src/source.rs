//! Fetch strategy selection for a validated URL.

use url::Url;

/// Substrings that identify the video platform and its short-link domain
const VIDEO_HOST_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Where a URL's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A YouTube video; content is its transcript
    Video(Url),
    /// Any other web page; content is its extracted text
    Generic(Url),
}

impl Source {
    /// Pick the fetch strategy by a case-sensitive substring match on the URL
    /// as it was submitted. `url` is the parsed form of `raw`.
    pub fn classify(raw: &str, url: Url) -> Self {
        if VIDEO_HOST_MARKERS.iter().any(|marker| raw.contains(marker)) {
            Source::Video(url)
        } else {
            Source::Generic(url)
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            Source::Video(url) | Source::Generic(url) => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Source::Video(_) => "video",
            Source::Generic(_) => "web page",
        }
    }
}
