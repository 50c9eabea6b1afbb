//! Tool catalogue and handlers.
//!
//! DESIGN
//! ======
//! Handlers talk to a `PaperBackend` so tests can run without arXiv or a
//! relay. Every tool answers with one text block holding a JSON document:
//! `{success: true, ...}` on success, `{success: false, error}` with
//! `isError: true` on failure.

use std::sync::Arc;

use agent::paper::clip_for_relay;
use agent::relay::{GenerateBody, RelayClient, RelayError};
use agent::sources::{DEFAULT_MAX_RELATED, PaperSearchHit, PaperSources, RelatedPaper};
use agent::{DEFAULT_TEMPERATURE, PaperMetadata, WritingStyle};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const NOT_FOUND: &str = "Paper not found on ArXiv or Semantic Scholar";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0} is required")]
    MissingArgument(&'static str),
    #[error("Either arxiv_id or title is required")]
    MissingRelatedTarget,
    #[error("API_KEY environment variable is required for blog generation")]
    MissingApiKey,
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
    #[error("Agent error: {0}")]
    Agent(#[from] RelayError),
}

// =============================================================================
// BACKEND
// =============================================================================

#[async_trait::async_trait]
pub trait PaperBackend: Send + Sync {
    async fn search_paper(&self, title: &str) -> Option<PaperSearchHit>;

    async fn find_related(&self, arxiv_id: Option<&str>, title: Option<&str>, max_results: usize) -> Vec<RelatedPaper>;

    /// Generate a post through the relay.
    ///
    /// # Errors
    ///
    /// Relay transport failures and relay error bodies.
    async fn generate(&self, api_key: &str, body: &GenerateBody) -> Result<String, RelayError>;
}

pub struct LiveBackend {
    sources: PaperSources,
    relay: RelayClient,
}

impl LiveBackend {
    #[must_use]
    pub fn new(sources: PaperSources, relay: RelayClient) -> Self {
        Self { sources, relay }
    }
}

#[async_trait::async_trait]
impl PaperBackend for LiveBackend {
    async fn search_paper(&self, title: &str) -> Option<PaperSearchHit> {
        self.sources.search_paper(title).await
    }

    async fn find_related(&self, arxiv_id: Option<&str>, title: Option<&str>, max_results: usize) -> Vec<RelatedPaper> {
        self.sources.find_related(arxiv_id, title, max_results).await
    }

    async fn generate(&self, api_key: &str, body: &GenerateBody) -> Result<String, RelayError> {
        tracing::info!(relay = self.relay.base(), "calling relay");
        self.relay.generate(api_key, body).await
    }
}

// =============================================================================
// RESULT ENVELOPE
// =============================================================================

#[derive(Debug, Serialize, PartialEq)]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ToolResult {
    fn json(value: &Value, is_error: bool) -> Self {
        Self { content: vec![TextContent { kind: "text", text: value.to_string() }], is_error }
    }

    #[must_use]
    pub fn ok(value: &Value) -> Self {
        Self::json(value, false)
    }

    #[must_use]
    pub fn error(err: &ToolError) -> Self {
        Self::json(&json!({ "success": false, "error": err.to_string() }), true)
    }
}

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateArgs {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    metadata: Option<PaperMetadata>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    writing_style: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RelatedArgs {
    #[serde(default)]
    arxiv_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    max_results: Option<usize>,
}

fn parse_args<T: for<'de> Deserialize<'de> + Default>(arguments: Value) -> Result<T, ToolError> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(arguments)?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Relay body for the `generate_blog` tool.
///
/// Emojis follow the alphaxiv style; humor follows alphaxiv and casual.
#[must_use]
pub fn generate_body(
    content: &str,
    metadata: Option<PaperMetadata>,
    temperature: Option<f64>,
    style: Option<&str>,
) -> GenerateBody {
    let writing_style = style.map_or(WritingStyle::AlphaXiv, WritingStyle::from_name);
    GenerateBody {
        pdf_content: clip_for_relay(content),
        temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
        include_emojis: writing_style == WritingStyle::AlphaXiv,
        include_humor: matches!(writing_style, WritingStyle::AlphaXiv | WritingStyle::Casual),
        custom_prompt: String::new(),
        writing_style,
        arxiv_metadata: metadata,
        extracted_images: Vec::new(),
    }
}

// =============================================================================
// ROUTER
// =============================================================================

pub struct ToolRouter {
    backend: Arc<dyn PaperBackend>,
    api_key: String,
}

impl ToolRouter {
    #[must_use]
    pub fn new(backend: Arc<dyn PaperBackend>, api_key: impl Into<String>) -> Self {
        Self { backend, api_key: api_key.into() }
    }

    /// Run one tool call; failures become an `isError` result, never a panic.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult {
        tracing::info!(tool = name, "tool called");
        match self.dispatch(name, arguments).await {
            Ok(value) => ToolResult::ok(&value),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool failed");
                ToolResult::error(&e)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        match name {
            "search_paper" => self.search_paper(parse_args(arguments)?).await,
            "generate_blog" => self.generate_blog(parse_args(arguments)?).await,
            "find_related" => self.find_related(parse_args(arguments)?).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    async fn search_paper(&self, args: SearchArgs) -> Result<Value, ToolError> {
        let title = non_blank(args.title).ok_or(ToolError::MissingArgument("Title"))?;
        Ok(match self.backend.search_paper(&title).await {
            Some(hit) => json!({
                "success": true,
                "result": { "url": hit.pdf_url, "metadata": hit.metadata },
            }),
            None => json!({ "success": false, "error": NOT_FOUND }),
        })
    }

    async fn generate_blog(&self, args: GenerateArgs) -> Result<Value, ToolError> {
        let content = non_blank(args.content).ok_or(ToolError::MissingArgument("Content"))?;
        if self.api_key.trim().is_empty() {
            return Err(ToolError::MissingApiKey);
        }
        let body = generate_body(&content, args.metadata, args.temperature, args.writing_style.as_deref());
        let blog_post = self.backend.generate(&self.api_key, &body).await?;
        Ok(json!({ "success": true, "blogPost": blog_post }))
    }

    async fn find_related(&self, args: RelatedArgs) -> Result<Value, ToolError> {
        let arxiv_id = non_blank(args.arxiv_id);
        let title = non_blank(args.title);
        if arxiv_id.is_none() && title.is_none() {
            return Err(ToolError::MissingRelatedTarget);
        }
        let max_results = args.max_results.filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_RELATED);
        let related = self
            .backend
            .find_related(arxiv_id.as_deref(), title.as_deref(), max_results)
            .await;
        Ok(json!({ "success": true, "relatedPapers": related }))
    }
}

// =============================================================================
// CATALOGUE
// =============================================================================

/// Tool descriptors for `tools/list`.
#[must_use]
pub fn definitions() -> Value {
    json!([
        {
            "name": "search_paper",
            "description": "Search for an academic paper by title using ArXiv API and Semantic Scholar. Returns paper metadata and PDF URL.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "The title of the academic paper to search for" }
                },
                "required": ["title"]
            }
        },
        {
            "name": "generate_blog",
            "description": "Generate an AlphaXiv-style blog post from paper content. Requires paper content/PDF text and optional metadata.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "The text content of the paper (extracted from PDF)" },
                    "metadata": {
                        "type": "object",
                        "description": "Optional metadata (title, authors, arxivId, etc.)",
                        "properties": {
                            "title": { "type": "string" },
                            "authors": { "type": "array", "items": { "type": "string" } },
                            "arxivId": { "type": "string" },
                            "published": { "type": "string" },
                            "categories": { "type": "array", "items": { "type": "string" } }
                        }
                    },
                    "temperature": { "type": "number", "description": "Generation temperature (0.0-1.0), default 0.8" },
                    "writingStyle": {
                        "type": "string",
                        "description": "Writing style: alphaxiv (default), technical, casual, academic",
                        "enum": ["alphaxiv", "technical", "casual", "academic"]
                    }
                },
                "required": ["content"]
            }
        },
        {
            "name": "find_related",
            "description": "Find related papers for a given paper using ArXiv categories and Semantic Scholar recommendations.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "arxiv_id": { "type": "string", "description": "ArXiv ID of the paper (e.g., 2103.00020)" },
                    "title": { "type": "string", "description": "Title of the paper (used if arxiv_id not available)" },
                    "max_results": { "type": "number", "description": "Maximum number of related papers to return (default 5)" }
                }
            }
        }
    ])
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
