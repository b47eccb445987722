//! Completion-service provider implementations.
//!
//! Each provider implements the [`ChatModel`] trait, so the pipeline does
//! not care which service (or test double) generates the advice.

pub mod common;
pub mod groq;
pub mod mock;

pub use common::{ChatModel, GenerateOptions, ModelResponse, TokenUsage};
pub use groq::GroqClient;
pub use mock::MockModel;
