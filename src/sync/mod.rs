//! Album-to-directory reconciliation.
//!
//! One run: index the local mirror, drain the remote listing page by page
//! (downloading anything missing and striking matched items from the
//! index), then delete whatever the index still holds. Deletions happen only
//! after the last page, so an item on a later page is never removed early.

pub mod inventory;

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::download::{DownloadOutcome, Downloader};
use crate::photos::{MediaItemPager, MediaLibrary, PhotosError};
use crate::retry::RetryConfig;
pub use inventory::{local_path, LocalInventory};

/// Run-aborting failures. Per-item problems are counted in [`SyncSummary`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to read local mirror {path}: {source}")]
    Inventory {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to search media items: {0}")]
    Listing(#[from] PhotosError),
}

/// Counters for one reconciliation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub pages: usize,
    pub remote_items: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub deleted: usize,
    pub delete_failed: usize,
}

impl SyncSummary {
    pub fn log(&self, elapsed: Duration) {
        info!("── Summary ──");
        info!(
            "  {} remote items across {} pages",
            self.remote_items, self.pages
        );
        info!(
            "  {} downloaded, {} already present, {} failed",
            self.downloaded, self.already_present, self.failed
        );
        info!(
            "  {} deleted, {} could not be deleted",
            self.deleted, self.delete_failed
        );
        info!("  elapsed: {}", format_duration(elapsed));
    }
}

/// Converges one local directory onto one remote album.
pub struct Reconciler<'a, L: MediaLibrary + ?Sized> {
    library: &'a L,
    downloader: &'a Downloader,
    album_id: &'a str,
    output_path: &'a Path,
    page_size: u32,
    retry: RetryConfig,
}

impl<'a, L: MediaLibrary + ?Sized> Reconciler<'a, L> {
    pub fn new(
        library: &'a L,
        downloader: &'a Downloader,
        album_id: &'a str,
        output_path: &'a Path,
        page_size: u32,
        retry: RetryConfig,
    ) -> Self {
        Self {
            library,
            downloader,
            album_id,
            output_path,
            page_size,
            retry,
        }
    }

    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let mut local = LocalInventory::scan(self.output_path)
            .await
            .map_err(|source| SyncError::Inventory {
                path: self.output_path.display().to_string(),
                source,
            })?;
        info!(local_images = local.len(), "Downloading images...");

        let mut summary = SyncSummary::default();
        let mut pager =
            MediaItemPager::new(self.library, self.album_id, self.page_size, self.retry);

        while let Some(items) = pager.next_page().await? {
            for item in items {
                summary.remote_items += 1;
                if !is_safe_identifier(&item.id) {
                    warn!("Skipping media item with unusable identifier {:?}", item.id);
                    summary.failed += 1;
                    continue;
                }

                local.mark_matched(&item.id);

                let path = local_path(self.output_path, &item.id);
                match self.downloader.fetch(&path, &item.download_url()).await {
                    Ok(DownloadOutcome::Downloaded { .. }) => summary.downloaded += 1,
                    Ok(DownloadOutcome::AlreadyPresent) => summary.already_present += 1,
                    Err(e) => {
                        warn!(
                            "Failed to download {} ({}): {}",
                            item.id,
                            item.filename.as_deref().unwrap_or("unnamed"),
                            e
                        );
                        summary.failed += 1;
                    }
                }
            }
        }
        summary.pages = pager.pages_fetched();

        info!(stale = local.len(), "Delete missing images...");
        for (id, path) in local.into_unmatched() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!("{} deleted", id);
                    summary.deleted += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("{} already gone", path.display());
                    summary.deleted += 1;
                }
                Err(e) => {
                    warn!("Failed to delete local file {}: {}", path.display(), e);
                    summary.delete_failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

/// Identifiers become file names, so they must be a single path component.
fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
