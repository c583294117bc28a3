//! LLM configuration read from the process environment.

use std::time::Duration;

/// Default chat-completions endpoint base (Groq's `OpenAI`-compatible API).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default response-length budget, in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Default bound on one outbound LLM call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the answer resolver.
///
/// Built once at startup and passed to [`crate::resolver::AnswerResolver`],
/// so whether answers come from a model or from placeholder text is fixed
/// for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// API credential. `None` selects placeholder mode.
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API, without the trailing path.
    pub base_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Response-length budget.
    pub max_tokens: u32,
    /// Per-request timeout for the outbound call.
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AiConfig {
    /// Reads the configuration from environment variables.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `GROQ_API_KEY` / `AI_API_KEY` | credential (first non-empty wins) |
    /// | `AI_BASE_URL` | API base URL |
    /// | `AI_MODEL` | model name |
    /// | `AI_MAX_TOKENS` | response-length budget |
    /// | `AI_TIMEOUT_SECS` | outbound call timeout |
    ///
    /// Unset or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = ["GROQ_API_KEY", "AI_API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty());

        let base_url = std::env::var("AI_BASE_URL").unwrap_or(defaults.base_url);
        let model = std::env::var("AI_MODEL").unwrap_or(defaults.model);
        let max_tokens = std::env::var("AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);
        let timeout = std::env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(defaults.timeout, Duration::from_secs);

        Self {
            api_key,
            base_url,
            model,
            max_tokens,
            timeout,
        }
    }

    /// Returns `true` when a credential is configured.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
