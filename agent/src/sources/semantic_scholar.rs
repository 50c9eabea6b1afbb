//! Semantic Scholar graph API client.

use serde::Deserialize;

use super::{PaperSearchHit, RelatedPaper, SOURCE_SEMANTIC_SCHOLAR, SourceError};
use crate::paper::PaperMetadata;

pub const DEFAULT_SCHOLAR_API_URL: &str = "https://api.semanticscholar.org/graph/v1";
const SERVICE: &str = "Semantic Scholar";
const SEARCH_FIELDS: &str = "paperId,title,authors,year,abstract,openAccessPdf,externalIds";
const PAPER_URL: &str = "https://www.semanticscholar.org/paper/";
const ARXIV_ABS_URL: &str = "https://arxiv.org/abs/";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ScholarPaper>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    #[serde(rename = "recommendedPapers", default)]
    recommended: Vec<ScholarPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScholarPaper {
    paper_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<ScholarAuthor>,
    #[serde(default)]
    year: Option<u32>,
    #[serde(rename = "abstract", default)]
    summary: Option<String>,
    #[serde(default)]
    open_access_pdf: Option<OpenAccessPdf>,
    #[serde(default)]
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ScholarAuthor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAccessPdf {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "ArXiv", default)]
    arxiv: Option<String>,
}

impl ScholarPaper {
    fn arxiv_id(&self) -> Option<&str> {
        self.external_ids.as_ref()?.arxiv.as_deref().filter(|id| !id.is_empty())
    }

    fn into_metadata(self) -> PaperMetadata {
        PaperMetadata {
            arxiv_id: self.arxiv_id().map(str::to_string),
            url: Some(format!("{PAPER_URL}{}", self.paper_id)),
            title: self.title,
            authors: self.authors.into_iter().filter_map(|a| a.name).collect(),
            summary: self.summary,
            published: self.year.map(|y| y.to_string()),
            updated: None,
            categories: Vec::new(),
        }
    }

    fn into_related(self) -> Option<RelatedPaper> {
        let title = self.title.clone()?;
        let arxiv_id = self.arxiv_id().unwrap_or_default().to_string();
        let url = if arxiv_id.is_empty() {
            format!("{PAPER_URL}{}", self.paper_id)
        } else {
            format!("{ARXIV_ABS_URL}{arxiv_id}")
        };
        Some(RelatedPaper { title, url, arxiv_id, source: SOURCE_SEMANTIC_SCHOLAR })
    }
}

fn parse_search(json: &str) -> Result<Vec<ScholarPaper>, SourceError> {
    serde_json::from_str::<SearchResponse>(json)
        .map(|r| r.data)
        .map_err(|e| SourceError::Parse { service: SERVICE, message: e.to_string() })
}

/// Best search match with an open-access PDF.
fn search_hit(papers: Vec<ScholarPaper>) -> Option<PaperSearchHit> {
    let paper = papers.into_iter().next()?;
    let pdf_url = paper.open_access_pdf.as_ref()?.url.clone()?;
    Some(PaperSearchHit { pdf_url, metadata: paper.into_metadata() })
}

fn parse_recommendations(json: &str) -> Result<Vec<RelatedPaper>, SourceError> {
    let response: RecommendationsResponse =
        serde_json::from_str(json).map_err(|e| SourceError::Parse { service: SERVICE, message: e.to_string() })?;
    Ok(response.recommended.into_iter().filter_map(ScholarPaper::into_related).collect())
}

pub struct ScholarClient {
    http: reqwest::Client,
    base: String,
}

impl ScholarClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        Self { http, base: base.into().trim_end_matches('/').to_string() }
    }

    /// Top title match; `None` without an open-access PDF.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and undecodable bodies.
    pub async fn search_title(&self, title: &str) -> Result<Option<PaperSearchHit>, SourceError> {
        let body = self
            .get("/paper/search", &[("query", title), ("limit", "1"), ("fields", SEARCH_FIELDS)])
            .await?;
        let hit = search_hit(parse_search(&body)?);
        if hit.is_none() {
            tracing::info!(title, "no open-access Semantic Scholar match");
        }
        Ok(hit)
    }

    /// Recommendations for the best title match, at most `limit`.
    ///
    /// # Errors
    ///
    /// Same as [`ScholarClient::search_title`].
    pub async fn recommendations(&self, title: &str, limit: usize) -> Result<Vec<RelatedPaper>, SourceError> {
        let body = self
            .get("/paper/search", &[("query", title), ("limit", "1"), ("fields", "paperId")])
            .await?;
        let Some(paper) = parse_search(&body)?.into_iter().next() else {
            return Ok(Vec::new());
        };
        let limit = limit.to_string();
        let body = self
            .get(
                &format!("/paper/{}/recommendations", paper.paper_id),
                &[("limit", limit.as_str()), ("fields", "title,externalIds")],
            )
            .await?;
        parse_recommendations(&body)
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base))
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Request { service: SERVICE, message: e.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { service: SERVICE, status: status.as_u16() });
        }
        response
            .text()
            .await
            .map_err(|e| SourceError::Request { service: SERVICE, message: e.to_string() })
    }
}
