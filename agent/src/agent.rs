//! Paper agent: credential routing, prompt building and one provider call.
//!
//! DESIGN
//! ======
//! `PaperAgent` is the seam the relay server depends on, so route tests can
//! swap in a mock. `BlogAgent` is the real chain:
//! parse credential -> build prompt -> `LlmClient::complete`.
//! An unrecognized credential fails before any network call.

use crate::llm::config::LlmConfig;
use crate::llm::{Credential, LlmClient, LlmError};
use crate::paper::{GenerationRequest, QuestionRequest};
use crate::prompt::PromptBuilder;

#[async_trait::async_trait]
pub trait PaperAgent: Send + Sync {
    /// Generate a blog post for a paper.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the credential is missing or unrecognized,
    /// or if the provider call fails.
    async fn generate_blog_post(&self, api_key: &str, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Answer a question about a paper.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PaperAgent::generate_blog_post`].
    async fn answer_question(&self, api_key: &str, request: &QuestionRequest) -> Result<String, LlmError>;
}

pub struct BlogAgent {
    llm: LlmClient,
    prompts: PromptBuilder,
}

impl BlogAgent {
    /// Build an agent from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM config is malformed.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// Build an agent from a typed config with the default prompt budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        Ok(Self { llm: LlmClient::from_config(config)?, prompts: PromptBuilder::default() })
    }

    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait::async_trait]
impl PaperAgent for BlogAgent {
    async fn generate_blog_post(&self, api_key: &str, request: &GenerationRequest) -> Result<String, LlmError> {
        let credential = Credential::parse(api_key)?;
        let prompt = self.prompts.blog(request);
        let post = self.llm.complete(&credential, &prompt, request.temperature).await?;
        tracing::info!(provider = %credential.kind(), chars = post.len(), "blog post generated");
        Ok(post)
    }

    async fn answer_question(&self, api_key: &str, request: &QuestionRequest) -> Result<String, LlmError> {
        let credential = Credential::parse(api_key)?;
        let prompt = self.prompts.question(request);
        self.llm.complete(&credential, &prompt, request.temperature).await
    }
}

#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;
