//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const OPENAI_MODEL: &str = "gpt-4o";
pub const PERPLEXITY_MODEL: &str = "sonar-pro";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

/// Hosted provider URLs. Overridable so tests and proxies can stand in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub anthropic: String,
    pub openai: String,
    pub perplexity: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            anthropic: DEFAULT_ANTHROPIC_API_URL.to_string(),
            openai: DEFAULT_OPENAI_API_URL.to_string(),
            perplexity: DEFAULT_PERPLEXITY_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LlmConfig {
    pub endpoints: ProviderEndpoints,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// All optional:
    /// - `ANTHROPIC_API_URL`, `OPENAI_API_URL`, `PERPLEXITY_API_URL`: vendor defaults
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 60
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] for an unparsable timeout or a zero
    /// request timeout.
    pub fn from_env() -> Result<Self, LlmError> {
        let endpoints = ProviderEndpoints {
            anthropic: env_url("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_API_URL),
            openai: env_url("OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
            perplexity: env_url("PERPLEXITY_API_URL", DEFAULT_PERPLEXITY_API_URL),
        };
        let timeouts = LlmTimeouts {
            request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)?,
        };
        if timeouts.request_secs == 0 {
            return Err(LlmError::ConfigParse("LLM_REQUEST_TIMEOUT_SECS must be positive".into()));
        }
        Ok(Self { endpoints, timeouts })
    }
}

fn env_url(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, LlmError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| LlmError::ConfigParse(format!("invalid {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
