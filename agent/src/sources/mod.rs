//! Paper sources: arXiv and Semantic Scholar metadata lookups.
//!
//! DESIGN
//! ======
//! Lookups enrich a generation; they never gate it. The combined searches
//! (`search_paper`, `find_related`) log a failed backend and move on to the
//! next one, so callers only see "found" or "not found".

pub mod arxiv;
pub mod semantic_scholar;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use crate::paper::PaperMetadata;
use arxiv::ArxivClient;
use semantic_scholar::ScholarClient;

pub const DEFAULT_MAX_RELATED: usize = 5;
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;

pub const SOURCE_ARXIV: &str = "ArXiv";
pub const SOURCE_SEMANTIC_SCHOLAR: &str = "Semantic Scholar";

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{service} request failed: {message}")]
    Request { service: &'static str, message: String },
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} response parse failed: {message}")]
    Parse { service: &'static str, message: String },
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// A paper located by title, with a downloadable PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperSearchHit {
    pub pdf_url: String,
    pub metadata: PaperMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPaper {
    pub title: String,
    pub url: String,
    /// Empty when the paper has no arXiv id.
    pub arxiv_id: String,
    pub source: &'static str,
}

// =============================================================================
// ARXIV IDS
// =============================================================================

static ARXIV_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}\.\d{4,5}(?:v\d+)?").unwrap());
static VERSION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"v\d+$").unwrap());

/// Pull an arXiv id (`2506.21170`, `2506.21170v2`) out of a file name.
///
/// Prefixed names such as `arxiv_2506.21170.pdf` match on the id itself.
#[must_use]
pub fn extract_arxiv_id(filename: &str) -> Option<String> {
    ARXIV_ID.find(filename).map(|m| m.as_str().to_string())
}

/// `2103.00020v1` -> `2103.00020`.
#[must_use]
pub fn unversioned_id(arxiv_id: &str) -> &str {
    VERSION_SUFFIX
        .find(arxiv_id)
        .map_or(arxiv_id, |m| &arxiv_id[..m.start()])
}

// =============================================================================
// COMBINED SEARCH
// =============================================================================

pub struct PaperSources {
    arxiv: ArxivClient,
    scholar: ScholarClient,
}

impl PaperSources {
    /// Build both clients from environment configuration.
    ///
    /// Optional: `ARXIV_API_URL`, `SEMANTIC_SCHOLAR_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_env() -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS))
            .user_agent(concat!("obsixiv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::HttpClientBuild(e.to_string()))?;
        let arxiv_base = env_or("ARXIV_API_URL", arxiv::DEFAULT_ARXIV_API_URL);
        let scholar_base = env_or("SEMANTIC_SCHOLAR_API_URL", semantic_scholar::DEFAULT_SCHOLAR_API_URL);
        Ok(Self::new(ArxivClient::new(http.clone(), arxiv_base), ScholarClient::new(http, scholar_base)))
    }

    #[must_use]
    pub fn new(arxiv: ArxivClient, scholar: ScholarClient) -> Self {
        Self { arxiv, scholar }
    }

    #[must_use]
    pub fn arxiv(&self) -> &ArxivClient {
        &self.arxiv
    }

    /// Find a paper by title: arXiv first, then Semantic Scholar.
    pub async fn search_paper(&self, title: &str) -> Option<PaperSearchHit> {
        match self.arxiv.search_title(title).await {
            Ok(Some(hit)) => return Some(hit),
            Ok(None) => tracing::info!(title, "no arXiv match"),
            Err(e) => tracing::warn!(error = %e, "arXiv search failed"),
        }
        match self.scholar.search_title(title).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, "Semantic Scholar search failed");
                None
            }
        }
    }

    /// Related papers from the paper's arXiv category, topped up with
    /// Semantic Scholar recommendations for `title`.
    ///
    /// At most `max_results` papers, unique by title.
    pub async fn find_related(&self, arxiv_id: Option<&str>, title: Option<&str>, max_results: usize) -> Vec<RelatedPaper> {
        let mut related = Vec::new();

        if let Some(id) = arxiv_id.filter(|id| !id.trim().is_empty()) {
            match self.arxiv.related_by_category(id, max_results).await {
                Ok(papers) => related.extend(papers),
                Err(e) => tracing::warn!(error = %e, arxiv_id = id, "arXiv related lookup failed"),
            }
        }

        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            if related.len() < max_results {
                match self.scholar.recommendations(title, max_results).await {
                    Ok(papers) => merge_unique(&mut related, papers, max_results),
                    Err(e) => tracing::warn!(error = %e, "Semantic Scholar recommendations failed"),
                }
            }
        }

        related.truncate(max_results);
        related
    }
}

/// Append `extra` until `cap`, skipping titles already present.
pub(crate) fn merge_unique(related: &mut Vec<RelatedPaper>, extra: Vec<RelatedPaper>, cap: usize) {
    for paper in extra {
        if related.len() >= cap {
            break;
        }
        if related.iter().any(|p| p.title == paper.title) {
            continue;
        }
        related.push(paper);
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Collapse runs of whitespace (Atom titles wrap across lines).
pub(crate) fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn related(title: &str) -> RelatedPaper {
        RelatedPaper { title: title.into(), url: String::new(), arxiv_id: String::new(), source: SOURCE_ARXIV }
    }

    #[test]
    fn extracts_bare_and_versioned_ids() {
        assert_eq!(extract_arxiv_id("2506.21170.pdf").as_deref(), Some("2506.21170"));
        assert_eq!(extract_arxiv_id("paper_2506.21170v2.pdf").as_deref(), Some("2506.21170v2"));
        assert_eq!(extract_arxiv_id("1706.0376").as_deref(), Some("1706.0376"));
    }

    #[test]
    fn extracts_prefixed_ids() {
        assert_eq!(extract_arxiv_id("ArXiv-2103.00020").as_deref(), Some("2103.00020"));
        assert_eq!(extract_arxiv_id("arxiv_2103.00020v1").as_deref(), Some("2103.00020v1"));
        assert_eq!(extract_arxiv_id("arXiv2103.00020.pdf").as_deref(), Some("2103.00020"));
    }

    #[test]
    fn unversioned_strips_only_the_suffix() {
        assert_eq!(unversioned_id("2103.00020v12"), "2103.00020");
        assert_eq!(unversioned_id("2103.00020"), "2103.00020");
    }

    #[test]
    fn no_id_in_plain_name() {
        assert_eq!(extract_arxiv_id("attention-is-all-you-need.pdf"), None);
        assert_eq!(extract_arxiv_id("report-2024.pdf"), None);
    }

    #[test]
    fn merge_dedupes_by_title_and_caps() {
        let mut list = vec![related("A"), related("B")];
        merge_unique(&mut list, vec![related("B"), related("C"), related("D")], 3);
        let titles: Vec<_> = list.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn squash_collapses_newlines() {
        assert_eq!(squash_whitespace("  Attention Is\n  All You Need "), "Attention Is All You Need");
    }
}
