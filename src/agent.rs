//! LLM agent module for single-shot summarisation.
//!
//! The whole document goes into one prompt (no chunking), the model is called
//! once, and any `<think>` reasoning block is stripped from the reply.

pub use crate::summary::Summary;

use crate::config::AgentConfig;
use crate::document::Document;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, error, info};

/// Prompt template; `{text}` is replaced with the document text
pub const PROMPT_TEMPLATE: &str = "
Provide an informative summary of the given content in 300 words:
Content:
{text}
";

/// Sampling temperature sent with every completion request
pub const TEMPERATURE: f32 = 0.7;

lazy_static! {
    static ref REASONING_BLOCK: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed")]
    RequestFailed(#[from] reqwest::Error),
    #[error("LLM API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to parse response")]
    ParseError(#[from] serde_json::Error),
    #[error("LLM response contained no completion")]
    EmptyResponse,
}

/// A text-completion backend
pub trait Completion {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AgentError>>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions API (Groq by default)
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatClient {
    /// Build the client once at startup from config and the API key
    pub fn new(config: &AgentConfig, api_key: &str) -> Result<Self, AgentError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

impl Completion for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(%status, "chat completion failed");
            return Err(AgentError::Api { status, body: text });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AgentError::EmptyResponse)
    }
}

/// Substitute the document text into the prompt template
pub fn render_prompt(document: &Document) -> String {
    PROMPT_TEMPLATE.replace("{text}", &document.text)
}

/// Summarise a document with exactly one model call.
///
/// Empty documents are not short-circuited. Input size is not capped, so a
/// document larger than the model's context window surfaces as an API error.
pub async fn summarize<C: Completion>(llm: &C, document: &Document) -> Result<Summary, AgentError> {
    let prompt = render_prompt(document);
    info!(prompt_chars = prompt.chars().count(), "requesting summary");

    let raw = llm.complete(&prompt).await?;
    debug!(raw_chars = raw.chars().count(), "received completion");

    Ok(Summary::new(strip_reasoning(&raw)))
}

/// Remove every `<think>...</think>` block and trim what is left
pub fn strip_reasoning(raw: &str) -> String {
    REASONING_BLOCK.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;
    use std::cell::RefCell;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Recorder {
        reply: String,
        prompts: RefCell<Vec<String>>,
    }

    impl Completion for Recorder {
        async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn document(text: &str) -> Document {
        Document::new(
            Url::parse("https://example.com").unwrap(),
            text.to_string(),
            Metadata::default(),
        )
    }

    fn client_for(server: &MockServer) -> ChatClient {
        client_with(server, AgentConfig::default())
    }

    fn client_with(server: &MockServer, config: AgentConfig) -> ChatClient {
        let config = AgentConfig {
            base_url: format!("{}/openai/v1/", server.uri()),
            ..config
        };
        ChatClient::new(&config, "gsk_test").unwrap()
    }

    #[test]
    fn strips_multiline_reasoning() {
        assert_eq!(
            strip_reasoning("<think>ignore me\nplease</think>Final answer."),
            "Final answer."
        );
    }

    #[test]
    fn strips_every_block_non_greedily() {
        let raw = "<think>a</think>Keep this. <think>b\nc</think>And this.";
        assert_eq!(strip_reasoning(raw), "Keep this. And this.");
    }

    #[test]
    fn leaves_untagged_text_alone() {
        assert_eq!(strip_reasoning("  plain <b>text</b>\n"), "plain <b>text</b>");
        assert_eq!(strip_reasoning("unclosed <think> tag"), "unclosed <think> tag");
    }

    #[test]
    fn prompt_embeds_text() {
        let prompt = render_prompt(&document("The body."));
        assert!(prompt.contains("informative summary of the given content in 300 words"));
        assert!(prompt.ends_with("Content:\nThe body.\n"));
    }

    #[tokio::test]
    async fn empty_document_still_calls_model_once() {
        let llm = Recorder {
            reply: "<think>nothing to see</think>\nThere was no content.".into(),
            prompts: RefCell::new(Vec::new()),
        };

        let summary = summarize(&llm, &document("")).await.unwrap();

        assert_eq!(summary.text, "There was no content.");
        let prompts = llm.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], render_prompt(&document("")));
    }

    #[tokio::test]
    async fn chat_client_sends_single_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-r1-distill-llama-70b",
                "temperature": 0.7,
                "messages": [{"role": "user", "content": "Say hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).complete("Say hi").await.unwrap();
        assert_eq!(reply, "hi");
    }

    #[tokio::test]
    async fn temperature_ignores_config_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "temperature": 0.7 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config: AgentConfig =
            toml::from_str("model = \"llama-3.3-70b-versatile\"\ntemperature = 1.5").unwrap();
        let reply = client_with(&server, config).complete("Say hi").await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[test]
    fn wrapped_causes_are_not_repeated_in_the_message() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AgentError::from(cause);

        assert_eq!(err.to_string(), "failed to parse response");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn api_errors_keep_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":{"message":"Invalid API Key"}}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).complete("Say hi").await.unwrap_err();
        match err {
            AgentError::Api { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Invalid API Key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("Say hi").await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("Say hi").await.unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
    }
}
