//! Idempotent media fetcher: a destination that already holds data is
//! never fetched again, and a failed fetch leaves nothing behind.

pub mod error;
pub mod file;

use std::path::Path;

use reqwest::Client;

use crate::retry::RetryConfig;
use error::DownloadError;

/// What a [`Downloader::fetch`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded { bytes: u64 },
    AlreadyPresent,
}

/// Fetches media items into the mirror directory.
///
/// Shares the process-wide `reqwest::Client` (and its client-wide timeout)
/// with the Photos API client.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    retry: RetryConfig,
}

impl Downloader {
    pub fn new(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Download `url` into `path` unless `path` is already a non-empty file.
    ///
    /// A zero-length file at `path` counts as absent and is replaced.
    pub async fn fetch(&self, path: &Path, url: &str) -> Result<DownloadOutcome, DownloadError> {
        if is_present(path).await? {
            tracing::debug!("{} already present, skipping", path.display());
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        let bytes = file::download_file(&self.client, url, path, &self.retry).await?;
        tracing::info!("Downloaded '{}' ({} bytes)", path.display(), bytes);
        Ok(DownloadOutcome::Downloaded { bytes })
    }
}

async fn is_present(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file() && meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
