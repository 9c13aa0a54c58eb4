use tracing::debug;

use super::types::{next_cursor, MediaItem};
use super::{classify, MediaLibrary, PhotosError};
use crate::retry::{self, RetryConfig};

/// Cursor-driven walk over one album's media items.
///
/// Pages are fetched lazily, one per [`MediaItemPager::next_page`] call, in
/// the order the API returns them. The walk ends after the first response
/// without a next-page token. A pager is single-use; build a new one per run.
pub struct MediaItemPager<'a, L: MediaLibrary + ?Sized> {
    library: &'a L,
    album_id: &'a str,
    page_size: u32,
    retry: RetryConfig,
    cursor: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a, L: MediaLibrary + ?Sized> MediaItemPager<'a, L> {
    pub fn new(library: &'a L, album_id: &'a str, page_size: u32, retry: RetryConfig) -> Self {
        Self {
            library,
            album_id,
            page_size,
            retry,
            cursor: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Fetch the next batch, or `Ok(None)` once the cursor is exhausted.
    ///
    /// Transient failures are retried per the retry config; anything left
    /// after that is returned to the caller and the cursor stays put, so the
    /// next call asks for the same page again.
    pub async fn next_page(&mut self) -> Result<Option<Vec<MediaItem>>, PhotosError> {
        if self.exhausted {
            return Ok(None);
        }

        let library = self.library;
        let album_id = self.album_id;
        let page_size = self.page_size;
        let cursor = self.cursor.clone();
        let token = cursor.as_deref();

        let page = retry::retry_with_backoff(&self.retry, "Media item search", classify, || {
            library.search_album(album_id, page_size, token)
        })
        .await?;

        self.pages_fetched += 1;
        self.cursor = next_cursor(page.next_page_token);
        self.exhausted = self.cursor.is_none();
        debug!(
            page = self.pages_fetched,
            items = page.media_items.len(),
            last = self.exhausted,
            "Fetched media item page"
        );

        Ok(Some(page.media_items))
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::{AlbumPage, MediaItemPage};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records the tokens it was asked for.
    struct ScriptedLibrary {
        responses: Mutex<VecDeque<Result<MediaItemPage, PhotosError>>>,
        tokens_seen: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedLibrary {
        fn new(responses: Vec<Result<MediaItemPage, PhotosError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                tokens_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl MediaLibrary for ScriptedLibrary {
        async fn search_album(
            &self,
            _album_id: &str,
            _page_size: u32,
            page_token: Option<&str>,
        ) -> Result<MediaItemPage, PhotosError> {
            self.tokens_seen
                .lock()
                .unwrap()
                .push(page_token.map(str::to_string));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra page request")
        }

        async fn list_albums(&self, _page_token: Option<&str>) -> Result<AlbumPage, PhotosError> {
            Ok(AlbumPage::default())
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> Result<MediaItemPage, PhotosError> {
        Ok(MediaItemPage {
            media_items: ids
                .iter()
                .map(|id| MediaItem {
                    id: id.to_string(),
                    base_url: format!("http://cdn/{id}"),
                    filename: None,
                })
                .collect(),
            next_page_token: next.map(str::to_string),
        })
    }

    fn no_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 0,
            base_delay_secs: 0,
            max_delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_two_pages_two_requests() {
        let lib = ScriptedLibrary::new(vec![page(&["a"], Some("X")), page(&["b"], Some(""))]);
        let mut pager = MediaItemPager::new(&lib, "alb", 100, no_retry());

        assert_eq!(pager.next_page().await.unwrap().unwrap()[0].id, "a");
        assert_eq!(pager.next_page().await.unwrap().unwrap()[0].id, "b");
        assert!(pager.next_page().await.unwrap().is_none());
        assert!(pager.next_page().await.unwrap().is_none());

        assert_eq!(pager.pages_fetched(), 2);
        let tokens = lib.tokens_seen.lock().unwrap().clone();
        assert_eq!(tokens, vec![None, Some("X".to_string())]);
    }

    #[tokio::test]
    async fn test_empty_page_with_token_continues() {
        let lib = ScriptedLibrary::new(vec![page(&[], Some("next")), page(&["z"], None)]);
        let mut pager = MediaItemPager::new(&lib, "alb", 100, no_retry());

        assert!(pager.next_page().await.unwrap().unwrap().is_empty());
        assert_eq!(pager.next_page().await.unwrap().unwrap()[0].id, "z");
        assert!(pager.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_is_returned() {
        let err = PhotosError::Api {
            status: 404,
            endpoint: "mediaItems:search".into(),
            message: "album not found".into(),
        };
        let lib = ScriptedLibrary::new(vec![Err(err)]);
        let mut pager = MediaItemPager::new(&lib, "alb", 100, no_retry());
        assert!(pager.next_page().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_page_keeps_cursor() {
        let err = PhotosError::Api {
            status: 400,
            endpoint: "mediaItems:search".into(),
            message: "rejected".into(),
        };
        let lib = ScriptedLibrary::new(vec![page(&["a"], Some("X")), Err(err), page(&["b"], None)]);
        let mut pager = MediaItemPager::new(&lib, "alb", 100, no_retry());

        pager.next_page().await.unwrap();
        assert!(pager.next_page().await.is_err());
        assert_eq!(pager.next_page().await.unwrap().unwrap()[0].id, "b");
        let tokens = lib.tokens_seen.lock().unwrap().clone();
        assert_eq!(
            tokens,
            vec![None, Some("X".to_string()), Some("X".to_string())]
        );
        assert_eq!(pager.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_with_same_token() {
        let transient = PhotosError::Api {
            status: 503,
            endpoint: "mediaItems:search".into(),
            message: "backend unavailable".into(),
        };
        let lib = ScriptedLibrary::new(vec![
            page(&["a"], Some("X")),
            Err(transient),
            page(&["b"], None),
        ]);
        let retry = RetryConfig {
            max_retries: 1,
            ..no_retry()
        };
        let mut pager = MediaItemPager::new(&lib, "alb", 100, retry);

        pager.next_page().await.unwrap();
        assert_eq!(pager.next_page().await.unwrap().unwrap()[0].id, "b");
        let tokens = lib.tokens_seen.lock().unwrap().clone();
        assert_eq!(
            tokens,
            vec![None, Some("X".to_string()), Some("X".to_string())]
        );
        assert_eq!(pager.pages_fetched(), 2);
    }
}
