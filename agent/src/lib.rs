//! Paper-to-blog agent.
//!
//! DESIGN
//! ======
//! Shared library behind the relay server, the protocol server and the
//! `obsixiv` host CLI. The chain for one generation is always:
//!
//! credential -> [`llm::credential::route`] -> [`prompt::PromptBuilder`]
//! -> provider adapter -> generated text.
//!
//! The result cache lives in [`cache`] and is owned by the host call site,
//! never by the agent itself.

pub mod agent;
pub mod cache;
pub mod llm;
pub mod paper;
pub mod prompt;
pub mod relay;
pub mod sources;

pub use agent::{BlogAgent, PaperAgent};
pub use llm::types::LlmError;
pub use paper::{DEFAULT_TEMPERATURE, GenerationRequest, GenerationSettings, PaperMetadata, QuestionRequest, StyleFlags, WritingStyle};
