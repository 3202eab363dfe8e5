//! OAuth client-credentials exchange for registry access.

use boxpub_core::error::{PublishError, Result};
use serde::Deserialize;

/// Audience requested for cloud API tokens.
pub const TOKEN_AUDIENCE: &str = "https://api.hashicorp.cloud";

/// Token endpoint path relative to the auth URL.
const TOKEN_PATH: &str = "/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange a client ID and secret for a bearer token.
pub async fn fetch_token(
    http: &reqwest::Client,
    auth_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String> {
    let url = token_url(auth_url);
    tracing::debug!(url = %url, "Requesting access token");

    let response = http
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("audience", TOKEN_AUDIENCE),
        ])
        .send()
        .await
        .map_err(|e| {
            PublishError::UnexpectedClientError(format!("Failed to request access token: {}", e))
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PublishError::registry(
            "Failure authenticating with the registry",
            format!("token endpoint returned {}: {}", status, body.trim()),
        ));
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        PublishError::InvalidResponse(format!("access token request: {}", e))
    })?;

    if token.access_token.is_empty() {
        return Err(PublishError::InvalidResponse(
            "access token request: empty access_token".to_string(),
        ));
    }

    Ok(token.access_token)
}

fn token_url(auth_url: &str) -> String {
    format!("{}{}", auth_url.trim_end_matches('/'), TOKEN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("https://auth.idp.hashicorp.com"),
            "https://auth.idp.hashicorp.com/oauth2/token"
        );
        assert_eq!(
            token_url("https://auth.example.com/"),
            "https://auth.example.com/oauth2/token"
        );
    }

    #[test]
    fn test_token_response_parsing() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "expires_in": 3600}"#).unwrap();
        assert_eq!(resp.access_token, "abc");
    }
}
