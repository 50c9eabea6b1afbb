//! Result cache: generated posts keyed by input fingerprint.
//!
//! DESIGN
//! ======
//! A fingerprint is `"{content}_{settings}"`: a hash of the paper text and a
//! hash of the canonical settings JSON, so the same text under different
//! settings never collides. A hit also requires the stored source identity
//! (arXiv id) to equal the caller's.
//!
//! PERSISTENCE
//! ===========
//! The whole map is one JSON document. Every `put` / `clear` rewrites it
//! (temp file + rename) before returning. There is no expiry.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::paper::{GenerationSettings, PaperMetadata};

/// Hex characters kept from each SHA-256 digest.
const HASH_HEX_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is not valid JSON: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// FINGERPRINT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint paper text under the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error only if the settings fail to serialize.
    pub fn new(text: &str, settings: &GenerationSettings) -> Result<Self, CacheError> {
        let canonical = serde_json::to_string(settings)?;
        Ok(Self(format!("{}_{}", short_hash(text), short_hash(&canonical))))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(HASH_HEX_LEN);
    for byte in digest.iter().take(HASH_HEX_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

// =============================================================================
// ENTRY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub blog_post: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PaperMetadata>,
    /// Creation time, unix milliseconds.
    pub timestamp: i64,
    pub settings: GenerationSettings,
}

impl CacheEntry {
    /// New entry stamped with the current time.
    #[must_use]
    pub fn new(blog_post: String, metadata: Option<PaperMetadata>, settings: GenerationSettings) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let timestamp = i64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX);
        Self { blog_post, metadata, timestamp, settings }
    }

    fn identity(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(PaperMetadata::identity)
    }
}

// =============================================================================
// CACHE
// =============================================================================

pub struct ResultCache {
    path: PathBuf,
    entries: BTreeMap<Fingerprint, CacheEntry>,
}

impl ResultCache {
    /// Load the snapshot at `path`; a missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| CacheError::Decode { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "cache loaded");
        Ok(Self { path, entries })
    }

    /// Empty cache bound to `path`; nothing is written until the first mutation.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), entries: BTreeMap::new() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a stored post. The stored source identity must equal `identity`
    /// (both absent counts as equal).
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint, identity: Option<&str>) -> Option<&CacheEntry> {
        self.entries
            .get(fingerprint)
            .filter(|entry| entry.identity() == identity)
    }

    /// Insert or replace an entry and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn put(&mut self, fingerprint: Fingerprint, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.insert(fingerprint, entry);
        self.save()
    }

    /// Drop every entry and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "cache saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
