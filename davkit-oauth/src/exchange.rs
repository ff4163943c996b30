//! Authorization-code-for-tokens exchange against the provider's token
//! endpoint.

use serde::Deserialize;

use crate::error::OAuthError;

/// Raw token endpoint response.
///
/// `refresh_token` is absent when offline access was not granted, which is
/// fatal: stored refresh tokens are the only way davkit re-authenticates.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// Everything the token endpoint needs besides the code itself.
#[derive(Debug, Clone)]
pub struct ExchangeRequest<'a> {
    pub token_url: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
    pub code_verifier: &'a str,
    pub redirect_uri: &'a str,
}

/// Redeem an authorization code. One blocking call, no internal retry.
pub async fn exchange_code(
    http: &reqwest::Client,
    request: &ExchangeRequest<'_>,
) -> Result<TokenResponse, OAuthError> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", request.code),
        ("redirect_uri", request.redirect_uri),
        ("client_id", request.client_id),
        ("client_secret", request.client_secret),
        ("code_verifier", request.code_verifier),
    ];

    let response = http.post(request.token_url).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OAuthError::Exchange {
            status: status.as_u16(),
            body,
        });
    }

    let tokens: TokenResponse = response.json().await?;

    if tokens.refresh_token.is_empty() {
        return Err(OAuthError::MissingRefreshToken);
    }

    Ok(tokens)
}
