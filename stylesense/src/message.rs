//! Message types for completion-service communication.
//!
//! These follow the chat completion API conventions: a message carries a
//! role and a list of content parts, where a part is either plain text or
//! an image reference.

use crate::image::OutfitImage;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message providing instructions.
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

impl MessageRole {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Content of a message: text or an image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Image URL content (for vision model APIs).
    #[serde(rename = "image_url")]
    ImageUrl {
        /// The image URL details.
        image_url: ImageUrlDetail,
    },
}

/// Image URL structure with detail level for vision APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlDetail {
    /// The URL of the image (an http(s) URL or a base64 data URL).
    pub url: String,
    /// Detail level for image processing: "low", "high", or "auto".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl MessageContent {
    /// Create a new text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a new image URL content.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlDetail {
                url: url.into(),
                detail: None,
            },
        }
    }

    /// Create image content from an [`OutfitImage`] as a base64 data URL.
    #[must_use]
    pub fn from_outfit_image(image: &OutfitImage) -> Self {
        Self::image_url(image.to_data_url())
    }

    /// Get the text content if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }

    /// Check if this is an image part.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::ImageUrl { .. })
    }
}

/// A chat message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: MessageRole,
    /// Content of the message.
    pub content: Vec<MessageContent>,
}

impl ChatMessage {
    /// Create a new system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: vec![MessageContent::text(content)],
        }
    }

    /// Create a new user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![MessageContent::text(content)],
        }
    }

    /// Create a new assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![MessageContent::text(content)],
        }
    }

    /// Create a new message with multiple content parts.
    #[must_use]
    pub const fn with_contents(role: MessageRole, contents: Vec<MessageContent>) -> Self {
        Self {
            role,
            content: contents,
        }
    }

    /// Get the joined text content of the message, if it has any text parts.
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        let texts: Vec<_> = self
            .content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }

    /// Check if any content part is an image.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.content.iter().any(MessageContent::is_image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageRole::System).unwrap(),
            "\"system\""
        );
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn text_content_joins_text_parts_only() {
        let msg = ChatMessage::with_contents(
            MessageRole::User,
            vec![
                MessageContent::text("describe"),
                MessageContent::image_url("data:image/png;base64,AAAA"),
            ],
        );
        assert_eq!(msg.text_content().as_deref(), Some("describe"));
        assert!(msg.has_image());
    }

    #[test]
    fn image_only_message_has_no_text() {
        let msg = ChatMessage::with_contents(
            MessageRole::User,
            vec![MessageContent::image_url("https://example.com/a.png")],
        );
        assert!(msg.text_content().is_none());
    }

    #[test]
    fn from_outfit_image_builds_data_url() {
        let image =
            OutfitImage::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0], ImageFormat::Jpeg).unwrap();
        let content = MessageContent::from_outfit_image(&image);
        match content {
            MessageContent::ImageUrl { image_url } => {
                assert!(image_url.url.starts_with("data:image/jpeg;base64,"));
            }
            MessageContent::Text { .. } => panic!("expected image content"),
        }
    }

    #[test]
    fn content_serializes_with_type_tag() {
        let json = serde_json::to_value(MessageContent::text("hi")).unwrap();
        assert_eq!(json["type"], "text");

        let json = serde_json::to_value(MessageContent::image_url("u")).unwrap();
        assert_eq!(json["type"], "image_url");
        assert_eq!(json["image_url"]["url"], "u");
    }
}
