use thiserror::Error;

/// Failures while obtaining an OAuth access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No usable credentials: set credentials.access_token, or a refresh token with client_id and client_secret")]
    MissingCredentials,

    #[error("Token endpoint returned HTTP {code}: {message}")]
    ApiError { code: u16, message: String },

    #[error("Failed to read token file {path}: {source}")]
    TokenFile {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
