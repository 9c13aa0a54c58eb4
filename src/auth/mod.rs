//! OAuth access-token acquisition for the Photos Library API.
//!
//! Resolution order: an explicit access token from the config, then a
//! refresh-token exchange (inline credentials merged with the token file),
//! then a bare access token from the token file.

pub mod error;
pub mod responses;

use reqwest::Client;

use self::error::AuthError;
use self::responses::{StoredToken, TokenErrorResponse, TokenResponse};
use crate::config::Credentials;

/// Obtain a bearer token for the Photos Library API.
pub async fn access_token(
    client: &Client,
    credentials: &Credentials,
    token_url: &str,
) -> Result<String, AuthError> {
    if let Some(token) = non_empty(&credentials.access_token) {
        tracing::debug!("Using access token from config");
        return Ok(token.to_string());
    }

    let stored = match &credentials.token_file {
        Some(path) => load_token_file(path).await?,
        None => StoredToken::default(),
    };

    let refresh_token = non_empty(&credentials.refresh_token).or(non_empty(&stored.refresh_token));
    let client_id = non_empty(&credentials.client_id).or(non_empty(&stored.client_id));
    let client_secret = non_empty(&credentials.client_secret).or(non_empty(&stored.client_secret));

    if let (Some(refresh_token), Some(client_id), Some(client_secret)) =
        (refresh_token, client_id, client_secret)
    {
        return refresh_access_token(client, token_url, client_id, client_secret, refresh_token)
            .await;
    }

    if let Some(token) = non_empty(&stored.access_token) {
        tracing::warn!("No refresh credentials, using stored access token as-is");
        return Ok(token.to_string());
    }

    Err(AuthError::MissingCredentials)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

async fn load_token_file(path: &std::path::Path) -> Result<StoredToken, AuthError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AuthError::TokenFile {
            path: path.display().to_string(),
            source,
        })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Exchange a refresh token for a fresh access token.
async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<String, AuthError> {
    tracing::debug!("Refreshing access token at {}", token_url);
    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(AuthError::ApiError {
            code: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = serde_json::from_str(&body)?;
    tracing::debug!(expires_in = ?token.expires_in, "Access token refreshed");
    Ok(token.access_token)
}
