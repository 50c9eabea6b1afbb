//! LLM: multi-provider adapter behind a single `complete` call.
//!
//! DESIGN
//! ======
//! `LlmClient` owns one shared `reqwest::Client` (carrying the per-call
//! timeout) and dispatches a parsed [`Credential`] to the Claude adapter or
//! to the chat-completions adapter configured for `OpenAI`, Perplexity or a
//! self-hosted endpoint. No retries: a failed call is reported as is.

pub mod anthropic;
pub mod config;
pub mod credential;
pub mod openai;
pub mod types;

use std::time::Duration;

use config::{ANTHROPIC_MODEL, LlmConfig, OPENAI_MODEL, PERPLEXITY_MODEL, ProviderEndpoints};
pub use credential::{Credential, route};
pub use types::{LlmError, Prompt, ProviderKind};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

pub struct LlmClient {
    http: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl LlmClient {
    /// Build a client from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is malformed or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoints: config.endpoints })
    }

    /// Run one completion against the provider named by `credential`.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's [`LlmError`].
    pub async fn complete(&self, credential: &Credential, prompt: &Prompt, temperature: f64) -> Result<String, LlmError> {
        tracing::info!(
            provider = %credential.kind(),
            system_chars = prompt.system.len(),
            user_chars = prompt.user.len(),
            temperature,
            "calling provider"
        );
        match credential {
            Credential::Anthropic { api_key } => {
                anthropic::AnthropicClient::new(
                    self.http.clone(),
                    self.endpoints.anthropic.clone(),
                    ANTHROPIC_MODEL.to_string(),
                )
                .complete(api_key, prompt, temperature)
                .await
            }
            Credential::OpenAi { api_key } => {
                self.chat_completions(ProviderKind::OpenAi, &self.endpoints.openai, OPENAI_MODEL)
                    .complete(Some(api_key), prompt, temperature)
                    .await
            }
            Credential::Perplexity { api_key } => {
                self.chat_completions(ProviderKind::Perplexity, &self.endpoints.perplexity, PERPLEXITY_MODEL)
                    .complete(Some(api_key), prompt, temperature)
                    .await
            }
            Credential::Local { endpoint, model } => {
                self.chat_completions(ProviderKind::Local, endpoint, model)
                    .complete(None, prompt, temperature)
                    .await
            }
        }
    }

    fn chat_completions(&self, provider: ProviderKind, url: &str, model: &str) -> openai::ChatCompletionsClient {
        openai::ChatCompletionsClient::new(self.http.clone(), provider, url.to_string(), model.to_string())
    }
}

pub(crate) fn request_error(provider: ProviderKind, err: &reqwest::Error) -> LlmError {
    let message = if err.is_timeout() { format!("request timed out: {err}") } else { err.to_string() };
    LlmError::ApiRequest { provider, message }
}
