//! Photos Library API client: album-scoped media search and album listing.

pub mod error;
mod pager;
pub mod types;

pub use error::PhotosError;
pub use pager::MediaItemPager;
pub use types::{Album, AlbumPage, MediaItemPage};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::retry::{self, RetryAction, RetryConfig};
use types::{ApiErrorResponse, SearchMediaItemsRequest};

/// Albums requested per `GET /v1/albums` call (API maximum).
const ALBUM_PAGE_SIZE: u32 = 50;

/// Remote media source. One call returns one page.
#[async_trait::async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn search_album(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MediaItemPage, PhotosError>;

    async fn list_albums(&self, page_token: Option<&str>) -> Result<AlbumPage, PhotosError>;
}

/// Authorized client for `photoslibrary.googleapis.com`.
///
/// Holds a clone of the process-wide `reqwest::Client`, so it shares the
/// connection pool with the downloader.
pub struct PhotosClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for PhotosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotosClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl PhotosClient {
    pub fn new(client: Client, base_url: &str, access_token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, PhotosError> {
        let http_err = |source| PhotosError::Http {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(http_err)?;
        let status = response.status();
        let body = response.text().await.map_err(http_err)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| match e.error.status {
                    Some(s) => format!("{} ({})", e.error.message, s),
                    None => e.error.message,
                })
                .unwrap_or(body);
            return Err(PhotosError::Api {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| PhotosError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl MediaLibrary for PhotosClient {
    async fn search_album(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MediaItemPage, PhotosError> {
        let url = format!("{}/v1/mediaItems:search", self.base_url);
        let body = SearchMediaItemsRequest {
            album_id,
            page_size,
            page_token,
        };
        debug!(album_id, has_token = page_token.is_some(), "Searching media items");
        self.send_json(self.client.post(&url).json(&body), "mediaItems:search")
            .await
    }

    async fn list_albums(&self, page_token: Option<&str>) -> Result<AlbumPage, PhotosError> {
        let url = format!("{}/v1/albums", self.base_url);
        let page_size = ALBUM_PAGE_SIZE.to_string();
        let mut query = vec![("pageSize", page_size.as_str())];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        self.send_json(self.client.get(&url).query(&query), "albums")
            .await
    }
}

pub(crate) fn classify(e: &PhotosError) -> RetryAction {
    if e.is_retryable() {
        RetryAction::Retry
    } else {
        RetryAction::Abort
    }
}

/// Fetch every album, following page tokens until they run out.
pub async fn list_all_albums<L: MediaLibrary + ?Sized>(
    library: &L,
    retry_config: &RetryConfig,
) -> Result<Vec<Album>, PhotosError> {
    let mut albums = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let token = cursor.as_deref();
        let page = retry::retry_with_backoff(retry_config, "Album listing", classify, || {
            library.list_albums(token)
        })
        .await?;
        albums.extend(page.albums);
        cursor = types::next_cursor(page.next_page_token);
        if cursor.is_none() {
            break;
        }
    }

    Ok(albums)
}
