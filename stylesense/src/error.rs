//! Unified error types for the advice pipeline.
//!
//! Remote-call failures, image validation problems, and captioning-model
//! failures each get their own type, all folded into [`Error`] at the
//! pipeline boundary.

use std::fmt;

/// Result type alias for stylesense operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the advice pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid configuration (e.g. no API credential).
    #[error("configuration error: {0}")]
    Config(String),

    /// Image ingestion or validation error.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// Local captioning error.
    #[error("caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Completion-service error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl Error {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors raised while ingesting an uploaded image.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    /// File extension outside the accepted set.
    #[error("unsupported image extension `{0}` (expected jpg, jpeg, or png)")]
    UnsupportedExtension(String),

    /// File contents are neither JPEG nor PNG.
    #[error("could not recognize image data as JPEG or PNG")]
    UnrecognizedData,

    /// Declared format disagrees with the file contents.
    #[error("declared format {declared:?} does not match image data ({detected:?})")]
    FormatMismatch {
        /// Format claimed by the caller or file extension.
        declared: crate::image::ImageFormat,
        /// Format detected from the file signature.
        detected: crate::image::ImageFormat,
    },

    /// I/O error while reading the upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the local captioning model.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CaptionError {
    /// Failed to fetch model artifacts from the model repository.
    #[error("failed to fetch model artifacts: {0}")]
    Fetch(String),

    /// Tokenizer could not be loaded or decoding failed.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Failed to decode the image into pixels.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Model construction or inference error.
    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),

    /// The model produced an empty caption.
    #[error("captioning model returned an empty caption")]
    EmptyCaption,
}

/// Error type for completion-service operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "groq").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of completion-service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Response format error.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// HTTP status error.
    HttpStatus,
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Auth,
            provider: Some(provider.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ResponseFormat,
            provider: None,
            message: format!("Expected {}, got {}", expected.into(), got.into()),
            code: None,
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            provider: None,
            message: message.into(),
            code: None,
        }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::HttpStatus,
            provider: None,
            message: format!("HTTP {status}: {}", body.into()),
            code: Some(status.to_string()),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}
