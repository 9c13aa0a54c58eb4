use thiserror::Error;

/// Errors from the Photos Library API.
#[derive(Debug, Error)]
pub enum PhotosError {
    #[error("Photos API returned HTTP {status} for {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}

impl PhotosError {
    /// Rate limiting, server errors and transport failures are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            PhotosError::Api { status, .. } => *status == 429 || *status >= 500,
            PhotosError::Http { .. } => true,
            PhotosError::Decode { .. } => false,
        }
    }
}
