//! LLM provider abstraction and implementations.
//!
//! Only `OpenAI`-compatible chat-completions servers are implemented; Groq,
//! `OpenAI` itself, and local servers (Ollama, vLLM, llama.cpp) all speak
//! that protocol.

pub mod openai;

use serde::{Deserialize, Serialize};

use crate::AiError;
use crate::config::AiConfig;

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from the LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    /// The model's raw text.
    pub text: String,
    /// Why the model stopped generating.
    pub stop_reason: StopReason,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Model finished its response naturally.
    EndTurn,
    /// Maximum tokens reached.
    MaxTokens,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<LlmResponse, AiError>;
}

/// Creates the provider described by `config`.
///
/// Returns `Ok(None)` when no credential is configured.
///
/// # Errors
///
/// Returns [`AiError::Config`] if the base URL is empty, or
/// [`AiError::Http`] if the HTTP client cannot be built.
pub fn create_provider(config: &AiConfig) -> Result<Option<Box<dyn LlmProvider>>, AiError> {
    let Some(api_key) = config.api_key.clone() else {
        log::warn!(
            "No AI credentials detected. Set GROQ_API_KEY (or AI_API_KEY) to enable \
             model answers; serving placeholder answers instead."
        );
        return Ok(None);
    };

    if config.base_url.trim().is_empty() {
        return Err(AiError::Config {
            message: "AI_BASE_URL is empty".to_string(),
        });
    }

    log::info!(
        "Using OpenAI-compatible provider at {} (model {})",
        config.base_url,
        config.model
    );

    let provider = openai::OpenAiProvider::new(
        api_key,
        config.model.clone(),
        config.base_url.clone(),
        config.timeout,
    )?;

    Ok(Some(Box::new(provider)))
}
