use super::*;

use std::sync::Mutex;

// The process environment is shared between test threads.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers hold `ENV_LOCK`.
unsafe fn clear_llm_env() {
    unsafe {
        std::env::remove_var("ANTHROPIC_API_URL");
        std::env::remove_var("OPENAI_API_URL");
        std::env::remove_var("PERPLEXITY_API_URL");
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_llm_env() };

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg, LlmConfig::default());
    assert_eq!(cfg.endpoints.anthropic, DEFAULT_ANTHROPIC_API_URL);
    assert_eq!(cfg.endpoints.perplexity, DEFAULT_PERPLEXITY_API_URL);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("OPENAI_API_URL", " http://proxy.test/v1/chat/completions ");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.endpoints.openai, "http://proxy.test/v1/chat/completions");
    assert_eq!(cfg.endpoints.anthropic, DEFAULT_ANTHROPIC_API_URL);
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_rejects_bad_timeout() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "soon");
    }

    let err = LlmConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("invalid LLM_REQUEST_TIMEOUT_SECS"));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_rejects_zero_timeout() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "0");
    }

    assert!(matches!(LlmConfig::from_env(), Err(LlmError::ConfigParse(_))));

    unsafe { clear_llm_env() };
}
