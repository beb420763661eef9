//! Content loading: dispatches a classified URL to the matching fetch strategy.

use crate::config::FetchConfig;
use crate::document::Document;
use crate::scraper::PageLoader;
use crate::source::Source;
use crate::youtube::TranscriptLoader;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// User-Agent presented to every fetched site
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.188 Safari/537.36";

pub(crate) const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub(crate) const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to fetch URL")]
    Http(#[from] reqwest::Error),
    #[error("not a recognised video URL: {0}")]
    InvalidVideoUrl(String),
    #[error("could not read video details: {0}")]
    VideoDetails(String),
    #[error("no transcript available for video {0}")]
    NoTranscript(String),
    #[error("failed to parse transcript: {0}")]
    Transcript(String),
}

/// Anything that can turn a classified source into a document
pub trait ContentLoader {
    fn load(&self, source: &Source) -> impl Future<Output = Result<Document, FetchError>>;
}

/// Default loader holding both fetch strategies
#[derive(Debug, Clone)]
pub struct Loader {
    pages: PageLoader,
    videos: TranscriptLoader,
}

impl Loader {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let pages = PageLoader::new(config)?;
        let videos = TranscriptLoader::new(config)?;
        debug!(
            pages_accept_invalid_certs = pages.accepts_invalid_certs(),
            videos_accept_invalid_certs = videos.accepts_invalid_certs(),
            "fetch clients ready"
        );
        Ok(Self { pages, videos })
    }
}

impl ContentLoader for Loader {
    async fn load(&self, source: &Source) -> Result<Document, FetchError> {
        info!(kind = source.kind(), url = %source.url(), "loading content");
        let document = match source {
            Source::Video(url) => self.videos.fetch(url).await?,
            Source::Generic(url) => self.pages.fetch(url).await?,
        };
        info!(chars = document.char_count(), "content loaded");
        Ok(document)
    }
}

/// Create an HTTP client that identifies itself as a common browser
pub(crate) fn http_client(
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );

    let mut builder = Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(accept_invalid_certs);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
