use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::DownloadError;
use crate::retry::{self, RetryAction, RetryConfig};

/// Sibling temp path the body is streamed into: `{name}.part`.
pub(crate) fn part_path(download_path: &Path) -> PathBuf {
    let mut name = download_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    download_path.with_file_name(name)
}

/// Download `url` to `download_path` through a `.part` temp file.
///
/// Each attempt starts from an empty `.part` file. On success the `.part`
/// file is renamed onto the destination; on failure it is removed, so the
/// destination is either complete or absent. Returns the byte count.
pub async fn download_file(
    client: &Client,
    url: &str,
    download_path: &Path,
    retry_config: &RetryConfig,
) -> Result<u64, DownloadError> {
    let part_path = part_path(download_path);
    let what = format!("Download of {}", download_path.display());

    retry::retry_with_backoff(
        retry_config,
        &what,
        |e: &DownloadError| {
            if e.is_retryable() {
                RetryAction::Retry
            } else {
                RetryAction::Abort
            }
        },
        || async {
            let result = attempt_download(client, url, download_path, &part_path).await;
            if result.is_err() {
                if let Err(e) = fs::remove_file(&part_path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!("Could not remove {}: {}", part_path.display(), e);
                    }
                }
            }
            result
        },
    )
    .await
}

/// Single download attempt.
async fn attempt_download(
    client: &Client,
    url: &str,
    download_path: &Path,
    part_path: &Path,
) -> Result<u64, DownloadError> {
    let path_str = download_path.display().to_string();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::Http {
            source: e,
            path: path_str.clone(),
            bytes_written: 0,
        })?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            status: response.status().as_u16(),
            path: path_str,
        });
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part_path)
        .await?;

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DownloadError::Http {
            source: e,
            path: path_str.clone(),
            bytes_written,
        })?;
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(part_path, download_path).await?;

    Ok(bytes_written)
}
