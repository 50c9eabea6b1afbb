//! LLM types: provider identity, prompt pair and errors.
//!
//! Provider-neutral types shared by the Claude and chat-completions adapters.

use std::fmt;

/// Output budget applied to every provider call.
pub const MAX_OUTPUT_TOKENS: u32 = 4000;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM routing and provider calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// No credential was supplied.
    #[error("API key required")]
    MissingApiKey,

    /// The credential matched none of the known prefixes.
    #[error(
        "unknown API key format. Supported: Perplexity (pplx-), Claude (sk-ant-), OpenAI (sk-), Local (http://...)"
    )]
    UnknownCredential,

    /// The HTTP request to the provider failed (connect, timeout, body read).
    #[error("{provider} request failed: {message}")]
    ApiRequest { provider: ProviderKind, message: String },

    /// The provider returned a non-success status without a readable error envelope.
    #[error("{provider} API response error: status {status}: {body}")]
    ApiResponse { provider: ProviderKind, status: u16, body: String },

    /// The provider returned an error envelope.
    #[error("{provider} error: {message}")]
    Provider { provider: ProviderKind, message: String },

    /// The provider response body could not be deserialized.
    #[error("{provider} response parse failed: {message}")]
    ApiParse { provider: ProviderKind, message: String },

    /// The response parsed but carried no generated text.
    #[error("empty response from {provider}")]
    EmptyResponse { provider: ProviderKind },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl LlmError {
    /// Stable code for logs and error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey => "E_MISSING_API_KEY",
            Self::UnknownCredential => "E_UNKNOWN_CREDENTIAL",
            Self::ApiRequest { .. } => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::Provider { .. } => "E_PROVIDER",
            Self::ApiParse { .. } => "E_API_PARSE",
            Self::EmptyResponse { .. } => "E_EMPTY_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// `true` for configuration errors that are raised before any network call.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::MissingApiKey | Self::UnknownCredential)
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// The vendor behind a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Perplexity,
    Anthropic,
    OpenAi,
    Local,
}

impl ProviderKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Perplexity => "Perplexity",
            Self::Anthropic => "Claude",
            Self::OpenAi => "OpenAI",
            Self::Local => "local model",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// PROMPT
// =============================================================================

/// System + user prompt pair handed to an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

// =============================================================================
// ERROR ENVELOPE
// =============================================================================

/// The `error` member of a provider error envelope.
///
/// Hosted vendors send an object with a `message`; self-hosted servers often
/// send a bare string.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Structured {
        message: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    Text(String),
}

impl ErrorDetail {
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Structured { message: Some(message), .. } => message,
            Self::Structured { message: None, kind: Some(kind) } => kind,
            Self::Structured { message: None, kind: None } => "unspecified error".to_string(),
            Self::Text(text) => text,
        }
    }
}

/// Just the error member, for non-success statuses.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

/// Map a non-success status to the most descriptive error available.
pub(crate) fn status_error(provider: ProviderKind, status: u16, body: String) -> LlmError {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => LlmError::Provider { provider, message: envelope.error.into_message() },
        Err(_) => LlmError::ApiResponse { provider, status, body },
    }
}
