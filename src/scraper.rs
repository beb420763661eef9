//! Web page fetching and text extraction for generic URLs.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use crate::config::FetchConfig;
use crate::document::{Document, Metadata};
use crate::loader::{http_client, FetchError};
use lazy_static::lazy_static;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

/// Containers likely to hold the main content, most specific first
const MAIN_SELECTORS: [&str; 5] = ["article", "main", "[role='main']", ".content", "#content"];

/// Elements whose text is read as content blocks
const BLOCK_TAGS: [&str; 11] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "pre", "blockquote", "td",
];

/// Elements whose text never counts as page content
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "noscript", "template", "head", "svg"];

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref BLOCKS: Selector = Selector::parse(&BLOCK_TAGS.join(", ")).unwrap();
    static ref MAIN: Vec<Selector> = MAIN_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();
}

/// Loader for ordinary web pages
#[derive(Debug, Clone)]
pub struct PageLoader {
    client: Client,
    accept_invalid_certs: bool,
}

impl PageLoader {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = http_client(config.accept_invalid_certs, config.timeout())?;
        Ok(Self {
            client,
            accept_invalid_certs: config.accept_invalid_certs,
        })
    }

    /// Whether certificate validation is skipped for page fetches
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Fetch a page and extract its title and text
    pub async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;
        debug!(bytes = html.len(), "fetched page markup");

        Ok(parse_page(url.clone(), &html))
    }
}

/// Build a document from raw page markup. Empty text is allowed.
pub fn parse_page(url: Url, html: &str) -> Document {
    let document = Html::parse_document(html);
    let metadata = Metadata {
        title: extract_title(&document),
        ..Metadata::default()
    };
    Document::new(url, extract_text(&document), metadata)
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    [&*TITLE, &*H1].into_iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .filter(|title| !title.is_empty())
    })
}

/// Extract readable text content from the page
fn extract_text(document: &Html) -> String {
    // Try to find main content areas first
    for selector in MAIN.iter() {
        if let Some(element) = document.select(selector).next() {
            let text = collect_blocks(element);
            if !text.is_empty() {
                return text;
            }
        }
    }

    let text = collect_blocks(document.root_element());
    if !text.is_empty() {
        return text;
    }

    // Pages without block markup: any visible text at all
    loose_text(document)
}

/// Join the text of outermost content blocks under `scope`
fn collect_blocks(scope: ElementRef<'_>) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for element in scope.select(&BLOCKS) {
        if has_ancestor_in(element, &BLOCK_TAGS) || has_ancestor_in(element, &SKIPPED_TAGS) {
            continue;
        }
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    blocks.join("\n\n")
}

fn loose_text(document: &Html) -> String {
    let pieces: Vec<String> = document
        .root_element()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let skipped = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
                });
                (!skipped).then(|| collapse_whitespace(text))
            }
            _ => None,
        })
        .filter(|piece| !piece.is_empty())
        .collect();

    pieces.join("\n")
}

fn has_ancestor_in(element: ElementRef<'_>, tags: &[&str]) -> bool {
    element.ancestors().any(|ancestor| {
        ancestor
            .value()
            .as_element()
            .is_some_and(|el| tags.contains(&el.name()))
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
