use serde::{Deserialize, Serialize};

/// Suffix that turns a media item's base URL into a full-resolution download.
pub const DOWNLOAD_SUFFIX: &str = "=d";

/// A media item from the Photos Library API.
///
/// `base_url` is not directly downloadable; see [`MediaItem::download_url`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl MediaItem {
    pub fn download_url(&self) -> String {
        format!("{}{}", self.base_url, DOWNLOAD_SUFFIX)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Body of `POST /v1/mediaItems:search`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaItemsRequest<'a> {
    pub album_id: &'a str,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

/// Response from `POST /v1/mediaItems:search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemPage {
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Response from `GET /v1/albums`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPage {
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error envelope used by Google APIs.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// An empty or missing token both mean "no further pages".
pub fn next_cursor(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}
