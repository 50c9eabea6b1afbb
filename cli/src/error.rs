use std::path::PathBuf;

use agent::cache::CacheError;
use agent::relay::RelayError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("missing API key; pass --api-key or set OBSIXIV_API_KEY")]
    MissingApiKey,
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a PDF file: {0}")]
    NotPdf(PathBuf),
    #[error("Could not extract enough text from PDF ({chars} characters)")]
    NotEnoughText { chars: usize },
    #[error("output file already exists: {0} (use --overwrite)")]
    OutputExists(PathBuf),
    #[error("{failed} of {total} PDFs failed")]
    BatchFailed { failed: usize, total: usize },
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("frontmatter encode failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("time formatting failed: {0}")]
    Time(#[from] time::error::Format),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
