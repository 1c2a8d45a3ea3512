//! Chat request/response types and the provider trait.

use axon_core::AppResult;
use serde::{Deserialize, Serialize};

/// Author of a chat turn sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Shape the reply must take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Free-form text
    #[default]
    Text,
    /// A single JSON object
    Json,
}

/// Chat completion request.
///
/// Built fluently:
/// ```
/// use axon_llm::{LlmRequest, OutputFormat};
///
/// let request = LlmRequest::new("llama3.2")
///     .system("Classify the query.")
///     .user("What is our leave policy?")
///     .temperature(0.1)
///     .json();
/// assert_eq!(request.format, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub temperature: Option<f32>,
    pub format: OutputFormat,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            format: OutputFormat::Text,
        }
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.turn(ChatRole::System, content)
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.turn(ChatRole::User, content)
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Constrain the reply to a JSON object.
    pub fn json(mut self) -> Self {
        self.format = OutputFormat::Json;
        self
    }

    fn turn(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(ChatTurn {
            role,
            content: content.into(),
        });
        self
    }
}

/// Chat completion reply.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    /// Model that actually served the request
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A chat completion provider.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "ollama", "openai").
    fn provider_name(&self) -> &str;

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
