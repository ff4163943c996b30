//! Capabilities the provisioning core consumes.
//!
//! Each trait is a narrow port implemented by an adapter in the CLI crate
//! (keychain, JSON config file, terminal prompts, CalDAV probe, local OAuth
//! server). The provisioner receives them explicitly; there are no ambient
//! globals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::Account;
use crate::error::{PromptError, StoreError};
use crate::provider::ProviderPreset;

/// OAuth client configuration stored per account, needed to redeem the
/// account's refresh token later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "tokenUrl")]
    pub token_url: String,
}

/// Tokens produced by a completed authorization.
///
/// Only the refresh token outlives the add flow; the access token and its
/// expiry are discarded since every later call re-derives auth from stored
/// config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token expiry as epoch milliseconds.
    pub expires_at_ms: i64,
}

/// Everything the authorizer needs for one authorization attempt.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

/// Input to a connectivity test against the remote calendar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub server_url: String,
    pub username: String,
    /// Plain password for basic auth, refresh token for OAuth2 accounts.
    pub password: String,
    pub provider_id: String,
    pub account_name: String,
}

/// Why an authorization attempt produced no tokens.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AuthorizationFailure(pub String);

/// Secret storage keyed by account name (OS keychain in production).
pub trait CredentialStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, name: &str, secret: &str) -> Result<(), StoreError>;
    /// Idempotent: deleting a missing entry is not an error.
    fn delete(&mut self, name: &str) -> Result<(), StoreError>;
}

/// The account registry.
pub trait AccountStore {
    fn load_all(&self) -> Result<Vec<Account>, StoreError>;
    /// Upsert by account name.
    fn save(&mut self, account: &Account) -> Result<(), StoreError>;
    fn remove(&mut self, name: &str) -> Result<(), StoreError>;
    fn get_default(&self) -> Result<Option<String>, StoreError>;
    fn set_default(&mut self, name: &str) -> Result<(), StoreError>;
}

/// Resolved server URLs for accounts whose preset does not fix one.
pub trait ServerUrlStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, name: &str, url: &str) -> Result<(), StoreError>;
    fn remove(&mut self, name: &str) -> Result<(), StoreError>;
}

/// Per-account OAuth client configuration.
pub trait OAuthConfigStore {
    fn get(&self, name: &str) -> Result<Option<OAuthClientConfig>, StoreError>;
    fn save(&mut self, name: &str, config: &OAuthClientConfig) -> Result<(), StoreError>;
    /// Idempotent: removing a missing entry is not an error.
    fn remove(&mut self, name: &str) -> Result<(), StoreError>;
}

/// Connectivity probe against the remote calendar service.
///
/// `Err` carries the human-readable reason the service was unreachable;
/// nothing about the account is persisted by the probe.
pub trait ConnectionTester {
    fn test(&self, params: &ConnectionParams) -> impl Future<Output = Result<(), String>>;
}

/// End-to-end OAuth authorization producing tokens.
pub trait Authorizer {
    fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<OAuthTokens, AuthorizationFailure>>;
}

/// Interactive prompting. Adapters enforce "required" at prompt time, so the
/// provisioner only trims what it receives.
pub trait Prompt {
    /// `None` means the user picked "custom provider".
    fn select_provider(
        &self,
        presets: &[ProviderPreset],
    ) -> Result<Option<ProviderPreset>, PromptError>;
    fn input_server_url(&self, hint: &str) -> Result<String, PromptError>;
    fn input_account_name(&self) -> Result<String, PromptError>;
    fn input_username(&self, hint: Option<&str>) -> Result<String, PromptError>;
    fn input_password(&self, hint: &str) -> Result<String, PromptError>;
    fn input_client_id(&self) -> Result<String, PromptError>;
    fn input_client_secret(&self) -> Result<String, PromptError>;
}
