//! Chat-model collaborator.
//!
//! [`ChatModel`] is the seam the extractor calls through, so tests can
//! script responses deterministically. [`OpenAiChatModel`] is the production
//! implementation against an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::ChatError;

/// Longest error-body excerpt carried on [`ChatError::Api`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of the conversation replayed to the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Text-completion collaborator. Expected to honor a "JSON only"
/// instruction but treated as unreliable either way.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

/// Chat model backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl OpenAiChatModel {
    /// Creates a model client against a base URL such as
    /// `https://api.openai.com/v1` (or a mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ChatError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cabflow/0.1 (booking-pipeline)")
            .build()?;
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ChatError::Api {
            status: 0,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = self.base_url.join("chat/completions").map_err(|e| ChatError::Api {
            status: 0,
            body: format!("invalid completions path: {e}"),
        })?;
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
        };
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let mut body = response.text().await?;
        if !status.is_success() {
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| ChatError::Deserialize {
                context: "chat/completions".to_owned(),
                source: e,
            })?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Api {
                status: status.as_u16(),
                body: "completion returned no choices".to_owned(),
            })
    }
}
