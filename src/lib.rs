//! # Briefly
//!
//! A TUI that summarises a single web page or YouTube video from its URL.
//!
//! ## Pipeline
//!
//! - **Validate**: the submitted text must be a well-formed web URL
//! - **Load**: YouTube URLs yield a caption transcript, anything else the
//!   readable text of the page
//! - **Summarise**: one chat-completion call with the whole document in the
//!   prompt, reasoning blocks stripped from the reply

pub mod agent;
pub mod config;
pub mod document;
pub mod loader;
pub mod pipeline;
pub mod scraper;
pub mod source;
pub mod summary;
pub mod ui;
pub mod validate;
pub mod youtube;

pub use config::Config;
pub use document::Document;
pub use pipeline::{Outcome, Pipeline};
pub use summary::Summary;
