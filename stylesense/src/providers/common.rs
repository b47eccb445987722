//! Common types and the model trait shared by all providers.

use crate::error::LlmError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Token usage information from a model response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Number of tokens in the input/prompt.
    pub input_tokens: u32,
    /// Number of tokens in the output/completion.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Create new token usage with specified counts.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Get total token count.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response from a model generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated message.
    pub message: ChatMessage,
    /// Token usage information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// Raw response from the API (provider-specific).
    #[serde(skip)]
    pub raw: Option<serde_json::Value>,
}

impl ModelResponse {
    /// Create a new model response.
    #[must_use]
    pub const fn new(message: ChatMessage) -> Self {
        Self {
            message,
            token_usage: None,
            raw: None,
        }
    }

    /// Set token usage.
    #[must_use]
    pub const fn with_token_usage(mut self, usage: TokenUsage) -> Self {
        self.token_usage = Some(usage);
        self
    }

    /// Set raw response.
    #[must_use]
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Get the text content of the response.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.message.text_content()
    }
}

/// Options for model generation requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Temperature for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerateOptions {
    /// Create new default generate options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

/// The trait implemented by chat-completion backends.
///
/// One call is one generation: the caller hands over the full message list
/// and gets back the first candidate completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Get the model identifier (e.g., "llama-3.1-8b-instant").
    fn model_id(&self) -> &str;

    /// Generate a response for the given messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response cannot be parsed.
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, LlmError>;
}
