//! The request pipeline: validate, load, summarise.

use crate::agent::{self, AgentError, Completion};
use crate::document::Document;
use crate::loader::{ContentLoader, FetchError};
use crate::source::Source;
use crate::summary::Summary;
use crate::validate::{check_input, InputError};
use std::error::Error as _;
use thiserror::Error;
use tracing::{info, warn};

/// Failure after validation, from fetching or from the model
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Summarise(#[from] AgentError),
}

impl PipelineError {
    /// The error and every underlying cause, outermost first
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();
        while let Some(cause) = source {
            let message = cause.to_string();
            if chain.last() != Some(&message) {
                chain.push(message);
            }
            source = cause.source();
        }
        chain
    }
}

/// Result of one submission; exactly one is shown to the user
#[derive(Debug)]
pub enum Outcome {
    EmptyInput,
    InvalidUrl,
    Summarised { document: Document, summary: Summary },
    Failed(PipelineError),
}

/// Validator, loader and summarizer wired together.
///
/// Both the loader and the LLM client are built once at startup and handed
/// in here; nothing is read from global state.
pub struct Pipeline<L, C> {
    loader: L,
    llm: C,
}

impl<L: ContentLoader, C: Completion> Pipeline<L, C> {
    pub fn new(loader: L, llm: C) -> Self {
        Self { loader, llm }
    }

    /// Run one submission to completion
    pub async fn run(&self, raw: &str) -> Outcome {
        let url = match check_input(raw) {
            Ok(url) => url,
            Err(InputError::Empty) => return Outcome::EmptyInput,
            Err(InputError::Invalid) => {
                info!(input = raw.trim(), "rejected invalid URL");
                return Outcome::InvalidUrl;
            }
        };

        match self.fetch_and_summarise(Source::classify(raw.trim(), url)).await {
            Ok((document, summary)) => Outcome::Summarised { document, summary },
            Err(e) => {
                warn!(error = %e, "summarisation failed");
                Outcome::Failed(e)
            }
        }
    }

    async fn fetch_and_summarise(
        &self,
        source: Source,
    ) -> Result<(Document, Summary), PipelineError> {
        let document = self.loader.load(&source).await?;
        let summary = agent::summarize(&self.llm, &document).await?;
        info!(words = summary.word_count(), "summary ready");
        Ok((document, summary))
    }
}

/// Validate and load a document without calling the model, so no LLM client
/// or credential is needed
pub async fn extract<L: ContentLoader>(loader: &L, raw: &str) -> Result<Document, ExtractError> {
    let url = check_input(raw)?;
    Ok(loader.load(&Source::classify(raw.trim(), url)).await?)
}

/// Failure of a load-only run
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
