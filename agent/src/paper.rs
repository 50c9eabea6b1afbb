//! Paper data model: generation options, metadata and text budgets.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_CHAT_TEMPERATURE: f64 = 0.7;

/// Characters of paper text clients send to the relay.
pub const CLIENT_TEXT_BUDGET: usize = 8_000;
pub const CLIENT_TRUNCATION_MARKER: &str = "\n\n[Content truncated for processing]";

/// Fewer extracted characters than this means extraction failed.
pub const MIN_EXTRACTED_CHARS: usize = 100;

// =============================================================================
// WRITING STYLE
// =============================================================================

/// Tone preset selecting the style block of the system prompt.
///
/// Unknown names decode to [`WritingStyle::AlphaXiv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum WritingStyle {
    #[default]
    AlphaXiv,
    Technical,
    Casual,
    Academic,
}

impl WritingStyle {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "technical" => Self::Technical,
            "casual" => Self::Casual,
            "academic" => Self::Academic,
            _ => Self::AlphaXiv,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AlphaXiv => "alphaxiv",
            Self::Technical => "technical",
            Self::Casual => "casual",
            Self::Academic => "academic",
        }
    }
}

impl From<String> for WritingStyle {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<WritingStyle> for &'static str {
    fn from(value: WritingStyle) -> Self {
        value.name()
    }
}

impl std::str::FromStr for WritingStyle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Bibliographic metadata for a paper, as returned by arXiv / Semantic Scholar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PaperMetadata {
    /// Source identity used to guard cache hits; blank ids count as absent.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.arxiv_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleFlags {
    pub include_emojis: bool,
    pub include_humor: bool,
}

impl Default for StyleFlags {
    fn default() -> Self {
        Self { include_emojis: true, include_humor: true }
    }
}

/// Everything the prompt builder needs for one blog post.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub paper_text: String,
    pub temperature: f64,
    pub flags: StyleFlags,
    pub custom_prompt: String,
    pub writing_style: WritingStyle,
    pub figures: Vec<String>,
    pub metadata: Option<PaperMetadata>,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(paper_text: impl Into<String>) -> Self {
        Self {
            paper_text: paper_text.into(),
            temperature: DEFAULT_TEMPERATURE,
            flags: StyleFlags::default(),
            custom_prompt: String::new(),
            writing_style: WritingStyle::default(),
            figures: Vec::new(),
            metadata: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            include_emojis: self.flags.include_emojis,
            include_humor: self.flags.include_humor,
            custom_prompt: self.custom_prompt.clone(),
            writing_style: self.writing_style,
        }
    }
}

/// The settings tuple that, with the paper text, identifies a generation.
///
/// Field order is the canonical serialization order used for fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub temperature: f64,
    pub include_emojis: bool,
    pub include_humor: bool,
    pub custom_prompt: String,
    pub writing_style: WritingStyle,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationRequest::new("").settings()
    }
}

/// A question about a paper.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRequest {
    pub pdf_content: String,
    pub question: String,
    pub temperature: f64,
}

// =============================================================================
// TEXT BUDGETS
// =============================================================================

/// Split `text` after at most `budget` characters.
///
/// Returns the kept prefix and whether anything was cut.
#[must_use]
pub fn truncate_chars(text: &str, budget: usize) -> (&str, bool) {
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Clip paper text to [`CLIENT_TEXT_BUDGET`] before it is sent to the relay.
#[must_use]
pub fn clip_for_relay(text: &str) -> String {
    match truncate_chars(text, CLIENT_TEXT_BUDGET) {
        (kept, true) => format!("{kept}{CLIENT_TRUNCATION_MARKER}"),
        (kept, false) => kept.to_string(),
    }
}
