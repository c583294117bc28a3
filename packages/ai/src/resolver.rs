//! Turns a question plus a ward digest into an answer string.
//!
//! Every path yields an [`AnswerResult`]. With a provider, the digest is sent
//! as system context and the question as the user message; a failed call is
//! logged and converted into fallback text that embeds the error and the
//! digest. Without a provider the answer is clearly-marked placeholder text.

use strum_macros::{AsRefStr, Display};

use crate::AiError;
use crate::config::AiConfig;
use crate::providers::{self, LlmProvider, Message};

/// Instructions prepended to the digest in the system prompt.
pub const SYSTEM_PROMPT_PREAMBLE: &str = "You are an urban planning assistant with access to \
     live ward data. Use the following data to answer questions.";

/// Where an answer's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AnswerSource {
    /// The model's own reply.
    Model,
    /// The model call failed and the text describes the failure.
    Fallback,
    /// No credential is configured.
    Placeholder,
}

/// A resolved answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    /// Text returned to the caller.
    pub text: String,
    /// How the text was produced.
    pub source: AnswerSource,
}

/// Builds the system prompt for a digest.
#[must_use]
pub fn system_prompt(digest: &str) -> String {
    format!("{SYSTEM_PROMPT_PREAMBLE}\n\n{digest}")
}

/// Placeholder answer used when no credential is configured.
#[must_use]
pub fn placeholder_answer(question: &str, digest: &str) -> String {
    format!("[Mock] Based on current data: {digest} Your question: '{question}'")
}

/// Fallback answer used when the model call fails.
#[must_use]
pub fn fallback_answer(error: &AiError, digest: &str) -> String {
    format!("LLM error: {error}. Using fallback: Based on current data, {digest}")
}

/// Resolves questions against an optional LLM provider.
pub struct AnswerResolver {
    provider: Option<Box<dyn LlmProvider>>,
    max_tokens: u32,
}

impl AnswerResolver {
    /// Creates a resolver. `None` selects placeholder mode.
    #[must_use]
    pub fn new(provider: Option<Box<dyn LlmProvider>>, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    /// Creates a resolver from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if a credential is configured but the provider
    /// cannot be constructed.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        Ok(Self::new(
            providers::create_provider(config)?,
            config.max_tokens,
        ))
    }

    /// Returns `true` when answers come from a model.
    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Answers `question` using `digest` as context. Never fails.
    pub async fn resolve(&self, question: &str, digest: &str) -> AnswerResult {
        let Some(provider) = &self.provider else {
            return AnswerResult {
                text: placeholder_answer(question, digest),
                source: AnswerSource::Placeholder,
            };
        };

        let messages = [Message::user(question)];
        match provider
            .chat(&system_prompt(digest), &messages, self.max_tokens)
            .await
        {
            Ok(response) => AnswerResult {
                text: response.text,
                source: AnswerSource::Model,
            },
            Err(e) => {
                log::warn!("LLM call failed, answering with fallback text: {e}");
                AnswerResult {
                    text: fallback_answer(&e, digest),
                    source: AnswerSource::Fallback,
                }
            }
        }
    }
}
