//! Claude Messages API adapter.
//!
//! Thin HTTP wrapper for `/v1/messages`. The system prompt travels inside the
//! single user message. Pure parsing in `parse_response` for testability.

use serde::{Deserialize, Serialize};

use super::types::{ErrorDetail, LlmError, MAX_OUTPUT_TOKENS, Prompt, ProviderKind, status_error};

const API_VERSION: &str = "2023-06-01";
const PROVIDER: ProviderKind = ProviderKind::Anthropic;

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl AnthropicClient {
    #[must_use]
    pub fn new(http: reqwest::Client, url: String, model: String) -> Self {
        Self { http, url, model }
    }

    /// Send one prompt and return the generated text.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses, error envelopes and
    /// text-less responses all surface as [`LlmError`].
    pub async fn complete(&self, api_key: &str, prompt: &Prompt, temperature: f64) -> Result<String, LlmError> {
        let content = format!("{}\n\n{}", prompt.system, prompt.user);
        let body = ApiRequest {
            model: &self.model,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature,
            messages: [ApiMessage { role: "user", content: &content }],
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| super::request_error(PROVIDER, &e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| super::request_error(PROVIDER, &e))?;

        if !(200..300).contains(&status) {
            return Err(status_error(PROVIDER, status, text));
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiEnvelope {
    Failure { error: ErrorDetail },
    Success { content: Vec<ContentBlock> },
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    /// Thinking, tool use and any future block type.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<String, LlmError> {
    let envelope: ApiEnvelope = serde_json::from_str(json).map_err(|e| LlmError::ApiParse {
        provider: PROVIDER,
        message: e.to_string(),
    })?;

    let blocks = match envelope {
        ApiEnvelope::Failure { error } => {
            return Err(LlmError::Provider { provider: PROVIDER, message: error.into_message() });
        }
        ApiEnvelope::Success { content } => content,
    };

    let text: String = blocks
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Unknown => None,
        })
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse { provider: PROVIDER });
    }
    Ok(text)
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
