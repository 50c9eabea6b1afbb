//! Post files written into the output folder.
//!
//! Filenames are `{YYYY-MM-DD}_{sanitized stem}.md`; every post starts with
//! a YAML frontmatter block describing the source PDF.

use std::path::PathBuf;

use agent::PaperMetadata;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use time::format_description::well_known::Rfc3339;

use crate::error::CliError;

pub const DEFAULT_OUTPUT_FOLDER: &str = "blog-posts";
pub const GENERATOR: &str = "ObsiXiv";

/// Replace everything outside `[A-Za-z0-9_-]` with `_` and lowercase.
#[must_use]
pub fn sanitize_name(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

#[must_use]
pub fn output_filename(date: Date, stem: &str) -> String {
    format!("{date}_{}.md", sanitize_name(stem))
}

#[derive(Debug, Serialize)]
struct Frontmatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    arxiv_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arxiv_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<String>,
    source_pdf: String,
    generated: &'a str,
    generator: &'a str,
}

/// Frontmatter block, closing `---` and blank line included.
///
/// Metadata fields appear only when metadata is known; missing values in
/// known metadata are empty strings.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn frontmatter(stem: &str, metadata: Option<&PaperMetadata>, generated: &str) -> Result<String, serde_yaml::Error> {
    let source_pdf = format!("{stem}.pdf");
    let fm = match metadata {
        Some(meta) => Frontmatter {
            title: meta.title.as_deref().unwrap_or(stem),
            arxiv_id: Some(meta.arxiv_id.as_deref().unwrap_or_default()),
            arxiv_url: Some(meta.url.as_deref().unwrap_or_default()),
            authors: Some(meta.authors.join(", ")),
            published: Some(meta.published.as_deref().unwrap_or_default()),
            categories: Some(meta.categories.join(", ")),
            source_pdf,
            generated,
            generator: GENERATOR,
        },
        None => Frontmatter {
            title: stem,
            arxiv_id: None,
            arxiv_url: None,
            authors: None,
            published: None,
            categories: None,
            source_pdf,
            generated,
            generator: GENERATOR,
        },
    };
    let yaml = serde_yaml::to_string(&fm)?;
    let body = yaml.strip_prefix("---\n").unwrap_or(&yaml);
    Ok(format!("---\n{body}---\n\n"))
}

/// Writes posts into one folder, creating it on first use.
pub struct PostWriter {
    folder: PathBuf,
    overwrite: bool,
}

impl PostWriter {
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self { folder: folder.into(), overwrite }
    }

    /// Write `post` for the PDF named `stem`, stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// Fails if the file exists (without `overwrite`) or cannot be written.
    pub async fn write(&self, stem: &str, metadata: Option<&PaperMetadata>, post: &str) -> Result<PathBuf, CliError> {
        self.write_at(OffsetDateTime::now_utc(), stem, metadata, post).await
    }

    pub(crate) async fn write_at(
        &self,
        now: OffsetDateTime,
        stem: &str,
        metadata: Option<&PaperMetadata>,
        post: &str,
    ) -> Result<PathBuf, CliError> {
        tokio::fs::create_dir_all(&self.folder)
            .await
            .map_err(CliError::io(&self.folder))?;
        let path = self.folder.join(output_filename(now.date(), stem));
        if !self.overwrite && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(CliError::OutputExists(path));
        }
        let generated = now.format(&Rfc3339)?;
        let contents = format!("{}{post}", frontmatter(stem, metadata, &generated)?);
        tokio::fs::write(&path, contents).await.map_err(CliError::io(&path))?;
        Ok(path)
    }
}

/// Split a written post into its parsed frontmatter and the body.
#[cfg(test)]
pub(crate) fn parse_post(doc: &str) -> (serde_yaml::Value, &str) {
    let rest = doc.strip_prefix("---\n").expect("post starts with frontmatter");
    let (yaml, body) = rest.split_once("\n---\n\n").expect("frontmatter is closed");
    (serde_yaml::from_str(yaml).expect("frontmatter is valid YAML"), body)
}
