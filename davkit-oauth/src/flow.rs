//! End-to-end PKCE authorization composed from the leaf pieces.

use chrono::Utc;
use url::Url;

use davkit_core::ports::{AuthorizationFailure, AuthorizationRequest, Authorizer, OAuthTokens};

use crate::browser::open_in_browser;
use crate::error::OAuthError;
use crate::exchange::{ExchangeRequest, exchange_code};
use crate::listener::{AUTHORIZATION_TIMEOUT, await_authorization_code, reserve_local_port};
use crate::pkce::PkceChallenge;

/// Authorizes by catching the provider redirect on an ephemeral local HTTP
/// server.
///
/// Nothing is retried; any failure surfaces to the caller, and a retry means
/// re-running the whole add-account flow.
pub struct LocalServerAuthorizer {
    http: reqwest::Client,
}

impl LocalServerAuthorizer {
    pub fn new() -> Self {
        LocalServerAuthorizer {
            http: reqwest::Client::new(),
        }
    }

    async fn run(&self, request: &AuthorizationRequest) -> Result<OAuthTokens, OAuthError> {
        let pkce = PkceChallenge::generate();
        let port = reserve_local_port().await?;
        let redirect_uri = format!("http://127.0.0.1:{port}");

        let auth_url = build_authorization_url(request, &pkce.challenge, &redirect_uri)?;

        eprintln!("Opening browser for OAuth authorization...");
        eprintln!("If the browser doesn't open, visit:\n{auth_url}\n");

        // Start waiting before touching the browser: a failed launch must not
        // keep the user from navigating manually.
        let wait = tokio::spawn(await_authorization_code(port, AUTHORIZATION_TIMEOUT));

        if open_in_browser(auth_url.as_str()).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        let code = wait
            .await
            .map_err(|err| OAuthError::Listener(std::io::Error::other(err)))??;

        eprintln!("Received authorization code, exchanging for tokens...");

        let tokens = exchange_code(
            &self.http,
            &ExchangeRequest {
                token_url: &request.token_url,
                client_id: &request.client_id,
                client_secret: &request.client_secret,
                code: &code,
                code_verifier: &pkce.verifier,
                redirect_uri: &redirect_uri,
            },
        )
        .await?;

        Ok(OAuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at_ms: Utc::now().timestamp_millis() + tokens.expires_in * 1000,
        })
    }
}

impl Default for LocalServerAuthorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Authorizer for LocalServerAuthorizer {
    async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<OAuthTokens, AuthorizationFailure> {
        self.run(request)
            .await
            .map_err(|err| AuthorizationFailure(err.to_string()))
    }
}

/// Build the authorization URL.
///
/// `access_type=offline` and `prompt=consent` make the provider reissue a
/// refresh token even on repeat authorizations.
fn build_authorization_url(
    request: &AuthorizationRequest,
    challenge: &str,
    redirect_uri: &str,
) -> Result<Url, OAuthError> {
    let mut url = Url::parse(&request.authorization_url)?;
    url.query_pairs_mut()
        .append_pair("client_id", &request.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &request.scopes.join(" "))
        .append_pair("code_challenge", challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            client_id: "client-123".to_string(),
            client_secret: "shh-456".to_string(),
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/calendar".to_string(),
                "openid".to_string(),
            ],
        }
    }

    #[test]
    fn test_authorization_url_carries_pkce_and_offline_params() {
        let url = build_authorization_url(&request(), "challenge-abc", "http://127.0.0.1:4242")
            .expect("url should build");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("redirect_uri"), Some("http://127.0.0.1:4242"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(
            get("scope"),
            Some("https://www.googleapis.com/auth/calendar openid")
        );
        assert_eq!(get("code_challenge"), Some("challenge-abc"));
        assert_eq!(get("code_challenge_method"), Some("S256"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("prompt"), Some("consent"));
        // The client secret never appears in the front-channel URL.
        assert!(!url.as_str().contains("shh-456"));
    }

    #[test]
    fn test_invalid_authorization_url_is_rejected() {
        let mut bad = request();
        bad.authorization_url = "not a url".to_string();
        let err = build_authorization_url(&bad, "c", "http://127.0.0.1:1")
            .expect_err("parse should fail");
        assert!(matches!(err, OAuthError::Url(_)));
    }
}
