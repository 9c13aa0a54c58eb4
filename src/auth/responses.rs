use serde::Deserialize;

/// Response from the OAuth token endpoint for a `refresh_token` grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Error body returned by the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// A persisted OAuth token, as written by the usual OAuth quickstart tools.
///
/// Both snake_case and Go-style camelCase field names are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct StoredToken {
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}
