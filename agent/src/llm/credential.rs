//! Credential dispatch: which provider a caller-supplied key belongs to.
//!
//! DESIGN
//! ======
//! The key's textual prefix (or URL scheme) is the only provider signal the
//! callers send. [`ROUTES`] is the single ordered table consulted by every
//! operation; it is evaluated top to bottom and the first match wins, so
//! `sk-ant-` must sit above the bare `sk-` row.

use std::fmt;

use super::types::{LlmError, ProviderKind};

/// Model used for self-hosted endpoints when the credential names none.
pub const DEFAULT_LOCAL_MODEL: &str = "llama3.1";

const LOCAL_CHAT_PATH: &str = "/v1/chat/completions";

// =============================================================================
// ROUTING TABLE
// =============================================================================

struct Route {
    matches: fn(&str) -> bool,
    kind: ProviderKind,
}

const ROUTES: &[Route] = &[
    Route { matches: is_perplexity, kind: ProviderKind::Perplexity },
    Route { matches: is_anthropic, kind: ProviderKind::Anthropic },
    Route { matches: is_openai, kind: ProviderKind::OpenAi },
    Route { matches: is_local_url, kind: ProviderKind::Local },
];

fn is_perplexity(key: &str) -> bool {
    key.starts_with("pplx-")
}

fn is_anthropic(key: &str) -> bool {
    key.starts_with("sk-ant-")
}

fn is_openai(key: &str) -> bool {
    key.starts_with("sk-")
}

fn is_local_url(key: &str) -> bool {
    key.starts_with("http://") || key.starts_with("https://")
}

/// Select the provider for a raw credential string.
///
/// # Errors
///
/// [`LlmError::MissingApiKey`] for a blank credential and
/// [`LlmError::UnknownCredential`] when no prefix matches.
pub fn route(raw: &str) -> Result<ProviderKind, LlmError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(LlmError::MissingApiKey);
    }
    ROUTES
        .iter()
        .find(|route| (route.matches)(key))
        .map(|route| route.kind)
        .ok_or(LlmError::UnknownCredential)
}

// =============================================================================
// PARSED CREDENTIAL
// =============================================================================

/// A credential resolved to its provider and call parameters.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Perplexity { api_key: String },
    Anthropic { api_key: String },
    OpenAi { api_key: String },
    /// Self-hosted OpenAI-compatible endpoint (`http://host:port|model`).
    Local { endpoint: String, model: String },
}

impl Credential {
    /// Route and unpack a raw credential.
    ///
    /// # Errors
    ///
    /// Same as [`route`].
    pub fn parse(raw: &str) -> Result<Self, LlmError> {
        let key = raw.trim();
        let credential = match route(key)? {
            ProviderKind::Perplexity => Self::Perplexity { api_key: key.to_owned() },
            ProviderKind::Anthropic => Self::Anthropic { api_key: key.to_owned() },
            ProviderKind::OpenAi => Self::OpenAi { api_key: key.to_owned() },
            ProviderKind::Local => {
                let (base, model) = match key.split_once('|') {
                    Some((base, model)) => (base.trim(), model.trim()),
                    None => (key, ""),
                };
                let model = if model.is_empty() { DEFAULT_LOCAL_MODEL } else { model };
                Self::Local { endpoint: local_endpoint(base), model: model.to_owned() }
            }
        };
        Ok(credential)
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Perplexity { .. } => ProviderKind::Perplexity,
            Self::Anthropic { .. } => ProviderKind::Anthropic,
            Self::OpenAi { .. } => ProviderKind::OpenAi,
            Self::Local { .. } => ProviderKind::Local,
        }
    }
}

// Keys never reach logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { endpoint, model } => f
                .debug_struct("Local")
                .field("endpoint", endpoint)
                .field("model", model)
                .finish(),
            other => f
                .debug_struct(other.kind().label())
                .field("api_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Full chat-completions URL for a self-hosted base URL.
///
/// A URL that already names a `/v1/` path is used as given.
#[must_use]
pub fn local_endpoint(base: &str) -> String {
    if base.contains("/v1/") {
        base.to_owned()
    } else {
        format!("{}{LOCAL_CHAT_PATH}", base.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod tests;
