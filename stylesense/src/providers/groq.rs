//! Groq chat-completions client (OpenAI-compatible API).

use super::common::{ChatModel, GenerateOptions, ModelResponse, TokenUsage};
use crate::error::{Error, LlmError};
use crate::message::{ChatMessage, MessageContent};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default Groq API base URL.
pub const GROQ_API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq API client for creating completion models.
///
/// # Example
///
/// ```rust,ignore
/// use stylesense::providers::GroqClient;
///
/// // From environment variable GROQ_API_KEY
/// let client = GroqClient::from_env()?;
///
/// // With explicit API key
/// let client = GroqClient::new("gsk_...");
/// ```
#[derive(Clone)]
pub struct GroqClient {
    pub(crate) http_client: reqwest::Client,
    pub(crate) api_key: Arc<str>,
    pub(crate) base_url: Arc<str>,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GroqClient {
    /// Create a new Groq client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> GroqClientBuilder {
        GroqClientBuilder::default()
    }

    /// Create a new Groq client from environment variables.
    ///
    /// Uses `GROQ_API_KEY` for the API key and optionally `GROQ_BASE_URL`
    /// for a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `GROQ_API_KEY` is not set. Checking
    /// here keeps a misconfigured process from ever issuing a request.
    pub fn from_env() -> crate::Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| Error::config("GROQ_API_KEY environment variable not set"))?;

        let mut builder = Self::builder().api_key(api_key);

        if let Ok(base_url) = std::env::var("GROQ_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        Ok(builder.build())
    }

    /// Create a completion model with the specified model ID.
    ///
    /// # Arguments
    ///
    /// * `model_id` - The model identifier (e.g., "llama-3.1-8b-instant")
    #[must_use]
    pub fn completion_model(&self, model_id: impl Into<String>) -> CompletionModel {
        CompletionModel::new(self.clone(), model_id)
    }

    /// Get the base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the authorization headers for API requests.
    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .expect("Invalid API key format"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

/// Builder for [`GroqClient`].
#[derive(Debug, Default)]
pub struct GroqClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl GroqClientBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Panics
    ///
    /// Panics if the API key is not set.
    #[must_use]
    pub fn build(self) -> GroqClient {
        let api_key = self.api_key.expect("API key is required");
        let base_url = self
            .base_url
            .unwrap_or_else(|| GROQ_API_BASE_URL.to_string());

        let mut client_builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout_secs {
            client_builder = client_builder.timeout(std::time::Duration::from_secs(timeout));
        }

        let http_client = client_builder.build().expect("Failed to build HTTP client");

        GroqClient {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

/// Groq chat completion model.
///
/// Implements the [`ChatModel`] trait against Groq's OpenAI-compatible
/// Chat Completions API.
#[derive(Clone)]
pub struct CompletionModel {
    client: GroqClient,
    model_id: String,
}

impl std::fmt::Debug for CompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionModel")
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl CompletionModel {
    /// Create a new completion model.
    pub(crate) fn new(client: GroqClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    /// Convert a content part to the wire format.
    fn convert_content(content: &MessageContent) -> Value {
        match content {
            MessageContent::Text { text } => serde_json::json!({
                "type": "text",
                "text": text
            }),
            MessageContent::ImageUrl { image_url } => serde_json::json!({
                "type": "image_url",
                "image_url": {
                    "url": image_url.url,
                    "detail": image_url.detail.as_deref().unwrap_or("auto")
                }
            }),
        }
    }

    /// Build the request body for the API.
    fn build_request_body(&self, messages: &[ChatMessage], options: &GenerateOptions) -> Value {
        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": Self::convert_messages(messages),
        });

        if let Some(temp) = options.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max) = options.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }

        body
    }

    /// Convert messages to the wire format.
    ///
    /// Text-only messages collapse to a plain string content; messages with
    /// an image part use the structured content-array form.
    fn convert_messages(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let mut obj = serde_json::json!({ "role": msg.role.as_str() });

                if msg.has_image() {
                    let content_array: Vec<Value> =
                        msg.content.iter().map(Self::convert_content).collect();
                    obj["content"] = serde_json::json!(content_array);
                } else if let Some(text) = msg.text_content() {
                    obj["content"] = serde_json::json!(text);
                }

                obj
            })
            .collect()
    }

    /// Parse the API response into a [`ModelResponse`].
    ///
    /// Only the first choice is used.
    fn parse_response(json: Value) -> Result<ModelResponse, LlmError> {
        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices"))?;

        let content = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::response_format("text content", "missing message content"))?;

        let message = ChatMessage::assistant(content);

        let token_usage = json.get("usage").map(|usage| {
            TokenUsage::new(
                u32::try_from(usage["prompt_tokens"].as_u64().unwrap_or(0)).unwrap_or(u32::MAX),
                u32::try_from(usage["completion_tokens"].as_u64().unwrap_or(0)).unwrap_or(u32::MAX),
            )
        });

        let mut response = ModelResponse::new(message).with_raw(json);
        response.token_usage = token_usage;
        Ok(response)
    }
}

#[async_trait]
impl ChatModel for CompletionModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    #[instrument(skip(self, messages, options), fields(model = %self.model_id))]
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, LlmError> {
        let body = self.build_request_body(&messages, &options);

        debug!("Sending request to Groq API");

        let response = self
            .client
            .http_client
            .post(format!("{}/chat/completions", self.client.base_url))
            .headers(self.client.auth_headers())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(if status == 401 {
                LlmError::auth("groq", error_text)
            } else {
                LlmError::http_status(status, error_text)
            });
        }

        let json: Value = response.json().await?;
        Self::parse_response(json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::MessageRole;

    #[test]
    fn client_builder() {
        let client = GroqClient::builder()
            .api_key("test-key")
            .base_url("https://proxy.example.com/v1")
            .timeout_secs(30)
            .build();

        assert_eq!(client.base_url(), "https://proxy.example.com/v1");
    }

    #[test]
    fn default_base_url() {
        let client = GroqClient::new("test-key");
        assert_eq!(client.base_url(), GROQ_API_BASE_URL);
    }

    #[test]
    fn model_id() {
        let client = GroqClient::new("test-key");
        let model = client.completion_model("llama-3.1-8b-instant");
        assert_eq!(model.model_id(), "llama-3.1-8b-instant");
    }

    #[test]
    fn from_env_without_key_is_a_config_error() {
        // SAFETY: tests in this crate do not depend on GROQ_API_KEY being
        // set; this is the only test that touches it.
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("GROQ_API_KEY");
        }

        let err = GroqClient::from_env().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn text_only_messages_collapse_to_string_content() {
        let messages = vec![
            ChatMessage::system("be helpful"),
            ChatMessage::user("advise me"),
        ];
        let body = CompletionModel::convert_messages(&messages);

        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["role"], "system");
        assert_eq!(body[0]["content"], "be helpful");
        assert_eq!(body[1]["content"], "advise me");
    }

    #[test]
    fn image_messages_use_content_array() {
        let messages = vec![ChatMessage::with_contents(
            MessageRole::User,
            vec![
                MessageContent::text("analyze this"),
                MessageContent::image_url("data:image/jpeg;base64,AAAA"),
            ],
        )];
        let body = CompletionModel::convert_messages(&messages);

        let content = body[0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn request_body_carries_model_and_max_tokens() {
        let client = GroqClient::new("test-key");
        let model = client.completion_model("llama-3.2-11b-vision-preview");
        let body = model.build_request_body(
            &[ChatMessage::user("hi")],
            &GenerateOptions::new().with_max_tokens(800),
        );

        assert_eq!(body["model"], "llama-3.2-11b-vision-preview");
        assert_eq!(body["max_tokens"], 800);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn parse_response_takes_first_choice() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "wear the blazer"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 20, "completion_tokens": 5}
        });

        let response = CompletionModel::parse_response(json).unwrap();
        assert_eq!(response.text(), Some("wear the blazer".to_string()));
        assert_eq!(response.token_usage, Some(TokenUsage::new(20, 5)));
    }

    #[test]
    fn parse_response_without_choices_fails() {
        let err = CompletionModel::parse_response(serde_json::json!({"choices": []})).unwrap_err();
        assert_eq!(err.kind, crate::error::LlmErrorKind::ResponseFormat);
    }
}
