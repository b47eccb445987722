//! Mock model implementation for testing.
//!
//! Returns predefined responses and records every request, so tests can
//! assert both what was sent and how many calls were made (including that
//! none were).

use super::common::{ChatModel, GenerateOptions, ModelResponse};
use crate::error::LlmError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mock model for testing.
///
/// Returns predefined responses in sequence, cycling through them, and
/// keeps a record of every message list it was asked to complete.
#[derive(Debug)]
pub struct MockModel {
    model_id: String,
    responses: Vec<String>,
    response_index: AtomicUsize,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockModel {
    /// Create a new mock model with predefined responses.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            responses,
            response_index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock model with a custom model ID.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Number of generate calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// The message lists of every recorded call, in order.
    #[must_use]
    pub fn recorded_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChatModel for MockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        _options: GenerateOptions,
    ) -> Result<ModelResponse, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(messages);

        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .get(index % self.responses.len().max(1))
            .cloned()
            .unwrap_or_else(|| "No response".to_string());

        Ok(ModelResponse::new(ChatMessage::assistant(response)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cycles_responses() {
        let model = MockModel::new(vec!["first".to_string(), "second".to_string()]);
        let options = GenerateOptions::default();

        let r1 = model.generate(vec![], options).await.unwrap();
        assert_eq!(r1.text(), Some("first".to_string()));

        let r2 = model.generate(vec![], options).await.unwrap();
        assert_eq!(r2.text(), Some("second".to_string()));

        let r3 = model.generate(vec![], options).await.unwrap();
        assert_eq!(r3.text(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn records_calls() {
        let model = MockModel::new(vec!["ok".to_string()]);
        assert_eq!(model.call_count(), 0);

        model
            .generate(vec![ChatMessage::user("hello")], GenerateOptions::default())
            .await
            .unwrap();

        assert_eq!(model.call_count(), 1);
        let calls = model.recorded_calls();
        assert_eq!(calls[0][0].text_content().as_deref(), Some("hello"));
    }

    #[test]
    fn custom_model_id() {
        let model = MockModel::new(vec!["test".to_string()]).with_model_id("custom-mock");
        assert_eq!(model.model_id(), "custom-mock");
    }
}
