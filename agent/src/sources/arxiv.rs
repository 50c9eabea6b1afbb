//! arXiv export API client (Atom feed).

use quick_xml::de::from_str;
use serde::Deserialize;

use super::{PaperSearchHit, RelatedPaper, SOURCE_ARXIV, SourceError, squash_whitespace, unversioned_id};
use crate::paper::PaperMetadata;

pub const DEFAULT_ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
const SERVICE: &str = "arXiv";
const ABS_URL: &str = "https://arxiv.org/abs/";

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    updated: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
    #[serde(rename = "category", default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@term")]
    term: String,
}

impl Entry {
    /// `http://arxiv.org/abs/2103.00020v1` -> `2103.00020v1`.
    fn arxiv_id(&self) -> Option<&str> {
        self.id.split_once("/abs/").map(|(_, id)| id.trim())
    }

    fn pdf_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.title.as_deref() == Some("pdf"))
            .map(|link| link.href.as_str())
    }

    fn into_metadata(self) -> PaperMetadata {
        let arxiv_id = self.arxiv_id().map(str::to_string);
        PaperMetadata {
            url: arxiv_id.as_ref().map(|id| format!("{ABS_URL}{id}")),
            arxiv_id,
            title: Some(squash_whitespace(&self.title)),
            authors: self.authors.into_iter().map(|a| a.name.trim().to_string()).collect(),
            summary: self.summary.map(|s| squash_whitespace(&s)),
            published: self.published.map(|p| p.trim().to_string()),
            updated: self.updated.map(|u| u.trim().to_string()),
            categories: self.categories.into_iter().map(|c| c.term).collect(),
        }
    }
}

/// Decode an Atom feed, dropping arXiv's error pseudo-entries.
fn parse_feed(xml: &str) -> Result<Vec<Entry>, SourceError> {
    let feed: Feed = from_str(xml).map_err(|e| SourceError::Parse { service: SERVICE, message: e.to_string() })?;
    Ok(feed
        .entries
        .into_iter()
        .filter(|entry| entry.arxiv_id().is_some())
        .collect())
}

pub struct ArxivClient {
    http: reqwest::Client,
    base: String,
}

impl ArxivClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        Self { http, base: base.into() }
    }

    /// Metadata for one paper id; `None` when arXiv has no such entry.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and undecodable feeds.
    pub async fn fetch_metadata(&self, arxiv_id: &str) -> Result<Option<PaperMetadata>, SourceError> {
        let entries = self.query(&[("id_list", arxiv_id)]).await?;
        Ok(entries.into_iter().next().map(|entry| {
            let mut metadata = entry.into_metadata();
            // Keep the id as the caller spelled it so cache identity stays stable.
            metadata.arxiv_id = Some(arxiv_id.to_string());
            metadata.url = Some(format!("{ABS_URL}{arxiv_id}"));
            metadata
        }))
    }

    /// Most relevant title match that carries a PDF link.
    ///
    /// # Errors
    ///
    /// Same as [`ArxivClient::fetch_metadata`].
    pub async fn search_title(&self, title: &str) -> Result<Option<PaperSearchHit>, SourceError> {
        let query = format!("ti:{title}");
        let entries = self
            .query(&[
                ("search_query", query.as_str()),
                ("start", "0"),
                ("max_results", "1"),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .await?;
        Ok(first_hit(entries))
    }

    /// Papers sharing the primary category of `arxiv_id`.
    ///
    /// The first result and the paper itself are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`ArxivClient::fetch_metadata`].
    pub async fn related_by_category(&self, arxiv_id: &str, max_results: usize) -> Result<Vec<RelatedPaper>, SourceError> {
        let Some(category) = self
            .query(&[("id_list", arxiv_id)])
            .await?
            .into_iter()
            .next()
            .and_then(|entry| entry.categories.into_iter().next())
        else {
            return Ok(Vec::new());
        };

        let query = format!("cat:{}", category.term);
        let limit = (max_results + 1).to_string();
        let entries = self
            .query(&[
                ("search_query", query.as_str()),
                ("start", "0"),
                ("max_results", limit.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .await?;
        Ok(related_from_entries(entries, arxiv_id))
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Vec<Entry>, SourceError> {
        let response = self
            .http
            .get(&self.base)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Request { service: SERVICE, message: e.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { service: SERVICE, status: status.as_u16() });
        }
        let xml = response
            .text()
            .await
            .map_err(|e| SourceError::Request { service: SERVICE, message: e.to_string() })?;
        parse_feed(&xml)
    }
}

fn first_hit(entries: Vec<Entry>) -> Option<PaperSearchHit> {
    let entry = entries.into_iter().next()?;
    let Some(pdf_url) = entry.pdf_link().map(str::to_string) else {
        tracing::info!(id = %entry.id, "arXiv match has no PDF link");
        return None;
    };
    Some(PaperSearchHit { pdf_url, metadata: entry.into_metadata() })
}

/// The original is matched on its unversioned id.
fn related_from_entries(entries: Vec<Entry>, original_id: &str) -> Vec<RelatedPaper> {
    let original = unversioned_id(original_id);
    entries
        .into_iter()
        .skip(1)
        .filter_map(|entry| {
            let id = entry.arxiv_id()?.to_string();
            (unversioned_id(&id) != original).then(|| RelatedPaper {
                title: squash_whitespace(&entry.title),
                url: format!("{ABS_URL}{id}"),
                arxiv_id: id,
                source: SOURCE_ARXIV,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "arxiv_test.rs"]
mod tests;
