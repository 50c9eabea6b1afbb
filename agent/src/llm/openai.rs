//! OpenAI-compatible chat-completions adapter.
//!
//! One client type serves three providers that share the wire format:
//! `OpenAI`, Perplexity and self-hosted servers (Ollama, LM Studio, vLLM).
//! Only the URL, model and auth header differ.

use serde::{Deserialize, Serialize};

use super::types::{ErrorDetail, LlmError, MAX_OUTPUT_TOKENS, Prompt, ProviderKind, status_error};

pub struct ChatCompletionsClient {
    http: reqwest::Client,
    provider: ProviderKind,
    url: String,
    model: String,
}

impl ChatCompletionsClient {
    #[must_use]
    pub fn new(http: reqwest::Client, provider: ProviderKind, url: String, model: String) -> Self {
        Self { http, provider, url, model }
    }

    /// Send one prompt and return the generated text.
    ///
    /// `api_key` is sent as a bearer token when present; self-hosted
    /// endpoints are called without auth.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses, error envelopes and
    /// text-less responses all surface as [`LlmError`].
    pub async fn complete(&self, api_key: Option<&str>, prompt: &Prompt, temperature: f64) -> Result<String, LlmError> {
        let body = CcRequest {
            model: &self.model,
            messages: [
                CcMessage { role: "system", content: &prompt.system },
                CcMessage { role: "user", content: &prompt.user },
            ],
            temperature,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| super::request_error(self.provider, &e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| super::request_error(self.provider, &e))?;

        tracing::debug!(provider = %self.provider, status, bytes = text.len(), "chat completions response");

        if !(200..300).contains(&status) {
            return Err(status_error(self.provider, status, text));
        }

        parse_chat_completions_response(self.provider, &text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    messages: [CcMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CcEnvelope {
    Failure { error: ErrorDetail },
    Success { choices: Vec<CcChoice> },
}

#[derive(Deserialize)]
struct CcChoice {
    message: Option<CcReply>,
}

#[derive(Deserialize)]
struct CcReply {
    content: Option<CcContent>,
}

/// Most servers send a string; a few send typed parts.
#[derive(Deserialize)]
#[serde(untagged)]
enum CcContent {
    Text(String),
    Parts(Vec<CcPart>),
}

#[derive(Deserialize)]
struct CcPart {
    text: Option<String>,
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_chat_completions_response(provider: ProviderKind, json_text: &str) -> Result<String, LlmError> {
    let envelope: CcEnvelope =
        serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse { provider, message: e.to_string() })?;

    let choices = match envelope {
        CcEnvelope::Failure { error } => {
            return Err(LlmError::Provider { provider, message: error.into_message() });
        }
        CcEnvelope::Success { choices } => choices,
    };

    let content = choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);

    let text = match content {
        Some(CcContent::Text(text)) => text,
        Some(CcContent::Parts(parts)) => parts.into_iter().filter_map(|p| p.text).collect(),
        None => String::new(),
    };

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse { provider });
    }
    Ok(text)
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
