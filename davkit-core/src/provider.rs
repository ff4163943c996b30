//! Built-in provider presets and the registry that serves them.
//!
//! Presets are plain serializable data; provider-specific password
//! normalization lives in the registry keyed by provider id so the catalog
//! itself stays serializable.

use serde::{Deserialize, Serialize};

/// OAuth2 endpoints for providers that authenticate with the
/// authorization-code flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthEndpoints {
    #[serde(rename = "authorizationUrl")]
    pub authorization_url: String,
    #[serde(rename = "tokenUrl")]
    pub token_url: String,
    pub scopes: Vec<String>,
}

/// How an account for this provider authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthMethod {
    /// Username + password (or app-specific password) over HTTP basic auth.
    Basic,
    /// OAuth2 authorization-code flow with PKCE; only the refresh token is
    /// stored.
    OAuth2(OAuthEndpoints),
}

/// A catalog entry describing a known calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPreset {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Fixed CalDAV server URL; empty for self-hosted providers where the
    /// user is asked for one.
    #[serde(rename = "serverUrl")]
    pub server_url: String,
    #[serde(rename = "authMethod")]
    pub auth_method: AuthMethod,
    /// Shown when prompting for the password or server URL.
    pub hint: String,
    #[serde(rename = "usernameHint", skip_serializing_if = "Option::is_none")]
    pub username_hint: Option<String>,
}

impl ProviderPreset {
    /// The OAuth endpoints if this preset authenticates via OAuth2.
    pub fn oauth_endpoints(&self) -> Option<&OAuthEndpoints> {
        match &self.auth_method {
            AuthMethod::OAuth2(endpoints) => Some(endpoints),
            AuthMethod::Basic => None,
        }
    }
}

/// Static catalog of known providers, built once at startup.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    presets: Vec<ProviderPreset>,
}

impl ProviderRegistry {
    /// The built-in preset catalog, in stable display order.
    pub fn builtin() -> Self {
        let preset = |id: &str,
                      display_name: &str,
                      server_url: &str,
                      auth_method: AuthMethod,
                      hint: &str,
                      username_hint: Option<&str>| {
            ProviderPreset {
                id: id.to_string(),
                display_name: display_name.to_string(),
                server_url: server_url.to_string(),
                auth_method,
                hint: hint.to_string(),
                username_hint: username_hint.map(str::to_string),
            }
        };

        let presets = vec![
            preset(
                "icloud",
                "Apple iCloud",
                "https://caldav.icloud.com",
                AuthMethod::Basic,
                "Use an app-specific password from appleid.apple.com",
                None,
            ),
            preset(
                "google",
                "Google Calendar",
                "https://apidata.googleusercontent.com/caldav/v2",
                AuthMethod::OAuth2(OAuthEndpoints {
                    authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                    token_url: "https://oauth2.googleapis.com/token".to_string(),
                    scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
                }),
                "Create an OAuth client at console.cloud.google.com",
                Some("full email address, e.g. you@gmail.com"),
            ),
            preset(
                "yandex",
                "Yandex Calendar",
                "https://caldav.yandex.ru",
                AuthMethod::Basic,
                "Use an app password from id.yandex.ru/security/app-passwords",
                Some("full email address, e.g. you@yandex.ru"),
            ),
            preset(
                "fastmail",
                "Fastmail",
                "https://caldav.fastmail.com/dav/calendars",
                AuthMethod::Basic,
                "Use an app password from Settings > Privacy & Security",
                None,
            ),
            preset(
                "nextcloud",
                "Nextcloud",
                "",
                AuthMethod::Basic,
                "Enter your Nextcloud server URL (e.g. https://cloud.example.com/remote.php/dav)",
                None,
            ),
            preset(
                "baikal",
                "Baikal",
                "",
                AuthMethod::Basic,
                "Enter your Baikal server URL (e.g. https://baikal.example.com/dav.php)",
                None,
            ),
        ];

        ProviderRegistry { presets }
    }

    /// All known presets in catalog order.
    pub fn presets(&self) -> &[ProviderPreset] {
        &self.presets
    }

    /// Look up a preset by its id.
    pub fn get(&self, id: &str) -> Option<&ProviderPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Apply the provider-specific password transform, if one is registered.
    ///
    /// Pure: identity for providers without a normalizer. iCloud app-specific
    /// passwords are often pasted with stray whitespace, which the server
    /// rejects.
    pub fn normalize_password(&self, provider_id: &str, raw: &str) -> String {
        match provider_id {
            "icloud" => raw.chars().filter(|c| !c.is_whitespace()).collect(),
            _ => raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_is_stable() {
        let registry = ProviderRegistry::builtin();
        let ids: Vec<&str> = registry.presets().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["icloud", "google", "yandex", "fastmail", "nextcloud", "baikal"]
        );
    }

    #[test]
    fn test_get_known_and_unknown_provider() {
        let registry = ProviderRegistry::builtin();

        let google = registry.get("google").expect("google preset should exist");
        let endpoints = google.oauth_endpoints().expect("google uses oauth2");
        assert_eq!(endpoints.token_url, "https://oauth2.googleapis.com/token");

        assert!(registry.get("protonmail").is_none());
    }

    #[test]
    fn test_self_hosted_presets_have_no_server_url() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.get("nextcloud").unwrap().server_url.is_empty());
        assert!(registry.get("baikal").unwrap().server_url.is_empty());
    }

    #[test]
    fn test_normalize_password_strips_whitespace_for_icloud() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(
            registry.normalize_password("icloud", " abcd-efgh ijkl-mnop\n"),
            "abcd-efghijkl-mnop"
        );
    }

    #[test]
    fn test_normalize_password_is_identity_by_default() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(
            registry.normalize_password("fastmail", " keep me "),
            " keep me "
        );
        assert_eq!(registry.normalize_password("custom", "p@ss"), "p@ss");
    }
}
