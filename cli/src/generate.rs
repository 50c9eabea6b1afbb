//! `obsixiv generate`: PDF in, post file out.
//!
//! DESIGN
//! ======
//! One PDF flows through relay text extraction, a minimum-length check,
//! clipping, an optional arXiv lookup keyed by the file name, the result
//! cache, relay generation, and finally the post file. Metadata lookup
//! failures are logged and ignored. A cache hit never touches the relay.

use std::path::{Path, PathBuf};
use std::time::Duration;

use agent::cache::{CacheEntry, Fingerprint, ResultCache};
use agent::paper::{MIN_EXTRACTED_CHARS, clip_for_relay};
use agent::relay::{ExtractPdfBody, GenerateBody, RelayClient};
use agent::sources::arxiv::ArxivClient;
use agent::sources::extract_arxiv_id;
use agent::{GenerationRequest, PaperMetadata};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::CliError;
use crate::output::PostWriter;

/// Pause between PDFs in a batch.
pub const BATCH_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Generated(PathBuf),
    Cached(PathBuf),
    /// Generated and written, but the cache write failed.
    NotStored { path: PathBuf, reason: String },
}

impl Outcome {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Generated(path) | Self::Cached(path) | Self::NotStored { path, .. } => path,
        }
    }

    /// User-facing warning, if any.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::NotStored { reason, .. } => Some(format!("⚠️ Result was not cached: {reason}")),
            Self::Generated(_) | Self::Cached(_) => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Pipeline {
    relay: RelayClient,
    arxiv: Option<ArxivClient>,
    cache: Option<ResultCache>,
    writer: PostWriter,
    api_key: String,
    template: GenerationRequest,
}

impl Pipeline {
    /// `template` carries the generation settings; its text and metadata
    /// are replaced per PDF.
    #[must_use]
    pub fn new(relay: RelayClient, writer: PostWriter, api_key: impl Into<String>, template: GenerationRequest) -> Self {
        Self { relay, arxiv: None, cache: None, writer, api_key: api_key.into(), template }
    }

    #[must_use]
    pub fn with_arxiv(mut self, arxiv: ArxivClient) -> Self {
        self.arxiv = Some(arxiv);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Turn one PDF into a post file.
    ///
    /// # Errors
    ///
    /// Missing API key, unreadable or non-PDF input, too little extracted
    /// text, relay failures, and output write failures.
    pub async fn process(&mut self, pdf: &Path) -> Result<Outcome, CliError> {
        if self.api_key.trim().is_empty() {
            return Err(CliError::MissingApiKey);
        }
        let file_name = display_name(pdf);
        let stem = pdf
            .file_stem()
            .map_or_else(|| file_name.clone(), |s| s.to_string_lossy().into_owned());

        let text = self.extract(pdf, &file_name).await?;
        let chars = text.trim().chars().count();
        if chars < MIN_EXTRACTED_CHARS {
            return Err(CliError::NotEnoughText { chars });
        }

        let mut request = self.template.clone();
        request.paper_text = clip_for_relay(&text);
        request.metadata = self.lookup_metadata(&file_name).await;
        let settings = request.settings();
        let fingerprint = Fingerprint::new(&request.paper_text, &settings)?;
        let identity = request.metadata.as_ref().and_then(PaperMetadata::identity);

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&fingerprint, identity)) {
            tracing::info!(%fingerprint, pdf = %file_name, "cache hit");
            let metadata = hit.metadata.clone().or_else(|| request.metadata.clone());
            let post = hit.blog_post.clone();
            let path = self.writer.write(&stem, metadata.as_ref(), &post).await?;
            return Ok(Outcome::Cached(path));
        }

        tracing::info!(relay = self.relay.base(), pdf = %file_name, "generating blog post");
        let post = self.relay.generate(&self.api_key, &GenerateBody::from(&request)).await?;

        let mut cache_failure = None;
        if let Some(cache) = self.cache.as_mut() {
            let entry = CacheEntry::new(post.clone(), request.metadata.clone(), settings);
            if let Err(e) = cache.put(fingerprint, entry) {
                tracing::warn!(error = %e, "cache write failed");
                cache_failure = Some(e.to_string());
            }
        }

        let path = self.writer.write(&stem, request.metadata.as_ref(), &post).await?;
        Ok(match cache_failure {
            Some(reason) => Outcome::NotStored { path, reason },
            None => Outcome::Generated(path),
        })
    }

    /// Process `pdfs` in order, pausing `delay` between items. One failure
    /// never stops the batch.
    pub async fn run_batch(&mut self, pdfs: &[PathBuf], delay: Duration) -> BatchSummary {
        let total = pdfs.len();
        let mut summary = BatchSummary::default();
        for (i, pdf) in pdfs.iter().enumerate() {
            let name = display_name(pdf);
            let progress = format!("[{}/{total}]", i + 1);
            eprintln!("{progress} Processing {name}...");
            match self.process(pdf).await {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    eprintln!("{progress} ✅ {name} completed");
                    if let Some(warning) = outcome.warning() {
                        eprintln!("{progress} {warning}");
                    }
                    println!("{}", outcome.path().display());
                }
                Err(e) => {
                    summary.failed += 1;
                    eprintln!("{progress} ❌ {name} failed: {e}");
                }
            }
            if i + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        summary
    }

    async fn extract(&self, pdf: &Path, file_name: &str) -> Result<String, CliError> {
        let bytes = read_pdf(pdf).await?;
        let body = ExtractPdfBody { pdf_base64: STANDARD.encode(bytes), filename: file_name.to_string() };
        Ok(self.relay.extract_pdf(&body).await?)
    }

    async fn lookup_metadata(&self, file_name: &str) -> Option<PaperMetadata> {
        let arxiv = self.arxiv.as_ref()?;
        let id = extract_arxiv_id(file_name)?;
        match arxiv.fetch_metadata(&id).await {
            Ok(Some(metadata)) => {
                tracing::info!(arxiv_id = %id, title = metadata.title.as_deref().unwrap_or_default(), "found arXiv metadata");
                Some(metadata)
            }
            Ok(None) => {
                tracing::info!(arxiv_id = %id, "no arXiv entry");
                None
            }
            Err(e) => {
                tracing::warn!(arxiv_id = %id, error = %e, "arXiv lookup failed");
                None
            }
        }
    }
}

/// Read a `.pdf` file from disk.
///
/// # Errors
///
/// Non-PDF extensions and read failures.
pub async fn read_pdf(pdf: &Path) -> Result<Vec<u8>, CliError> {
    let is_pdf = pdf
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(CliError::NotPdf(pdf.to_path_buf()));
    }
    tokio::fs::read(pdf).await.map_err(CliError::io(pdf))
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
