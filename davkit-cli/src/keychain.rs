//! OS keychain adapters for the credential vault and the OAuth client
//! config registry.

use keyring::Entry;

use davkit_core::error::StoreError;
use davkit_core::ports::{CredentialStore, OAuthClientConfig, OAuthConfigStore};

const SERVICE_NAME: &str = "davkit";
const OAUTH_CONFIG_PREFIX: &str = "oauth-config";

fn entry(key: &str) -> Result<Entry, StoreError> {
    Entry::new(SERVICE_NAME, key)
        .map_err(|err| StoreError::new(format!("Keychain entry for \"{key}\" failed: {err}")))
}

fn get_secret(key: &str) -> Result<Option<String>, StoreError> {
    match entry(key)?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(StoreError::new(format!(
            "Keychain read for \"{key}\" failed: {err}"
        ))),
    }
}

fn set_secret(key: &str, secret: &str) -> Result<(), StoreError> {
    entry(key)?
        .set_password(secret)
        .map_err(|err| StoreError::new(format!("Keychain write for \"{key}\" failed: {err}")))
}

fn delete_secret(key: &str) -> Result<(), StoreError> {
    match entry(key)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(StoreError::new(format!(
            "Keychain delete for \"{key}\" failed: {err}"
        ))),
    }
}

/// Account secrets (passwords and refresh tokens) keyed by account name.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringCredentials;

impl CredentialStore for KeyringCredentials {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        get_secret(name)
    }

    fn set(&mut self, name: &str, secret: &str) -> Result<(), StoreError> {
        set_secret(name, secret)
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        delete_secret(name)
    }
}

/// OAuth client configs stored as JSON under `oauth-config:{name}` entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringOAuthConfigs;

fn config_key(name: &str) -> String {
    format!("{OAUTH_CONFIG_PREFIX}:{name}")
}

impl OAuthConfigStore for KeyringOAuthConfigs {
    fn get(&self, name: &str) -> Result<Option<OAuthClientConfig>, StoreError> {
        let Some(raw) = get_secret(&config_key(name))? else {
            return Ok(None);
        };
        let config = serde_json::from_str(&raw).map_err(|err| {
            StoreError::new(format!("Stored OAuth config for \"{name}\" is invalid: {err}"))
        })?;
        Ok(Some(config))
    }

    fn save(&mut self, name: &str, config: &OAuthClientConfig) -> Result<(), StoreError> {
        let raw = serde_json::to_string(config).map_err(|err| {
            StoreError::new(format!("Failed to serialize OAuth config for \"{name}\": {err}"))
        })?;
        set_secret(&config_key(name), &raw)
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        delete_secret(&config_key(name))
    }
}
