//! Language generation for the Miku assistant.
//!
//! Wraps an OpenAI-compatible chat-completions endpoint (Groq by default)
//! behind the [`LanguageModel`] trait. The adapter makes a single attempt per
//! call and reports every failure as an [`LlmError`]; retry policy, if ever
//! added, belongs here and not in the turn pipeline.

pub mod client;
pub mod error;

pub use client::{LlmClientConfig, OpenAiCompatClient, DEFAULT_BASE_URL};
pub use error::LlmError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model used when none is configured. Small and fast, to keep turns snappy.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// The channel a chat message is sent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of the instruction sequence sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Hard cap on generated tokens.
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.8,
            max_tokens: 300,
        }
    }
}

/// A remote chat model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates the next assistant message for `messages`.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, LlmError>;
}
