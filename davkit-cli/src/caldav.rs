//! CalDAV connectivity probe.
//!
//! A single PROPFIND for the current user principal decides reachability.
//! Basic-auth accounts authenticate directly; OAuth accounts first redeem
//! their refresh token against the stored token URL and send the resulting
//! access token as a bearer.

use serde::Deserialize;

use davkit_core::ports::{ConnectionParams, ConnectionTester, OAuthConfigStore};
use davkit_core::provider::{AuthMethod, ProviderRegistry};

use crate::keychain::KeyringOAuthConfigs;

const PRINCIPAL_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<propfind xmlns="DAV:"><prop><current-user-principal/></prop></propfind>"#;

pub struct CalDavTester {
    http: reqwest::Client,
    registry: ProviderRegistry,
    oauth_configs: KeyringOAuthConfigs,
}

impl CalDavTester {
    pub fn new(registry: ProviderRegistry, oauth_configs: KeyringOAuthConfigs) -> Self {
        CalDavTester {
            http: reqwest::Client::new(),
            registry,
            oauth_configs,
        }
    }

    fn uses_oauth(&self, provider_id: &str) -> bool {
        matches!(
            self.registry.get(provider_id).map(|p| &p.auth_method),
            Some(AuthMethod::OAuth2(_))
        )
    }

    /// Redeem the account's refresh token for a short-lived access token.
    async fn fetch_access_token(&self, params: &ConnectionParams) -> Result<String, String> {
        let config = self
            .oauth_configs
            .get(&params.account_name)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| {
                format!(
                    "No OAuth client config stored for account \"{}\"",
                    params.account_name
                )
            })?;

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
        }

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", params.password.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| format!("Token refresh request failed: {err}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Token refresh failed ({status}): {body}"));
        }

        let tokens: RefreshResponse = response
            .json()
            .await
            .map_err(|err| format!("Token refresh response was invalid: {err}"))?;

        Ok(tokens.access_token)
    }
}

impl ConnectionTester for CalDavTester {
    async fn test(&self, params: &ConnectionParams) -> Result<(), String> {
        let propfind = reqwest::Method::from_bytes(b"PROPFIND")
            .map_err(|err| format!("Invalid HTTP method: {err}"))?;

        let mut request = self
            .http
            .request(propfind, &params.server_url)
            .header("Depth", "0")
            .header("Content-Type", "application/xml")
            .body(PRINCIPAL_PROPFIND);

        request = if self.uses_oauth(&params.provider_id) {
            let access_token = self.fetch_access_token(params).await?;
            request.bearer_auth(access_token)
        } else {
            request.basic_auth(&params.username, Some(&params.password))
        };

        let response = request
            .send()
            .await
            .map_err(|err| format!("CalDAV server unreachable: {err}"))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("CalDAV server returned {status}"))
        }
    }
}
