use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

/// Extension every mirrored file carries.
pub const IMAGE_EXTENSION: &str = ".jpg";

/// Content type a mirrored file must sniff as.
const EXPECTED_CONTENT_TYPE: &str = "image/jpeg";

/// Bytes inspected when sniffing a file's content type.
const SNIFF_LEN: u64 = 512;

/// Temp file left behind when a download into `{id}.jpg` was interrupted.
const PARTIAL_SUFFIX: &str = ".jpg.part";

/// Expected mirror location of a media item.
pub fn local_path(output_path: &Path, id: &str) -> PathBuf {
    output_path.join(format!("{id}{IMAGE_EXTENSION}"))
}

/// Valid local images that have not (yet) been seen in the remote listing.
///
/// Keyed by identifier (file name minus `.jpg`); the value is the file the
/// identifier was read from. Matching a remote item removes its entry, so
/// whatever is left after the listing is drained is stale.
#[derive(Debug, Default)]
pub struct LocalInventory {
    unmatched: HashMap<String, PathBuf>,
}

impl LocalInventory {
    /// Index every non-empty regular `{id}.jpg` file in `dir` that sniffs
    /// as a JPEG, and remove `{id}.jpg.part` leftovers of interrupted
    /// downloads.
    ///
    /// Files named any other way are never indexed, so the sweep cannot
    /// touch them. Failing to list the directory is an error. Problems with
    /// a single entry are logged and that entry is left out.
    pub async fn scan(dir: &Path) -> std::io::Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut unmatched = HashMap::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Failed to stat {}: {}", path.display(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::warn!("Skipping non UTF-8 file name {}", path.display());
                continue;
            };

            if name.ends_with(PARTIAL_SUFFIX) {
                remove_leftover(&path).await;
                continue;
            }

            let id = match name.strip_suffix(IMAGE_EXTENSION) {
                Some(id) if !id.is_empty() => id,
                _ => continue,
            };
            if metadata.len() == 0 || !is_valid_image(&path).await {
                continue;
            }

            unmatched.insert(id.to_string(), path);
        }

        tracing::debug!(count = unmatched.len(), "Scanned local mirror {}", dir.display());
        Ok(Self { unmatched })
    }

    /// Record that `id` exists remotely. Returns whether it was a local image.
    pub fn mark_matched(&mut self, id: &str) -> bool {
        self.unmatched.remove(id).is_some()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.unmatched.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.unmatched.len()
    }

    /// Entries never matched, sorted by identifier.
    pub fn into_unmatched(self) -> Vec<(String, PathBuf)> {
        let mut stale: Vec<_> = self.unmatched.into_iter().collect();
        stale.sort();
        stale
    }
}

async fn remove_leftover(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed leftover partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

async fn is_valid_image(path: &Path) -> bool {
    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Failed to open image {}: {}", path.display(), e);
            return false;
        }
    };

    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    if let Err(e) = file.take(SNIFF_LEN).read_to_end(&mut head).await {
        tracing::warn!("Failed to read image {}: {}", path.display(), e);
        return false;
    }

    sniff_content_type(&head) == Some(EXPECTED_CONTENT_TYPE)
}

/// Detect an image MIME type from leading magic bytes.
pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}
