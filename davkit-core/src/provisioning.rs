//! Add/remove account orchestration.
//!
//! Provisioning an account touches several independent stores (keychain,
//! account registry, server-URL registry, OAuth client registry) with no
//! transaction spanning them. The OAuth branch therefore records an explicit
//! undo action for every write made before the connectivity test and replays
//! the list in reverse when the test fails, so a failed add never leaves a
//! half-provisioned account behind.

use crate::account::Account;
use crate::error::{DavKitError, DavKitResult, StoreError};
use crate::ports::{
    AccountStore, AuthorizationRequest, Authorizer, ConnectionParams, ConnectionTester,
    CredentialStore, OAuthClientConfig, OAuthConfigStore, Prompt, ServerUrlStore,
};
use crate::provider::{OAuthEndpoints, ProviderRegistry};

/// A compensating action for one forward write.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Undo {
    OAuthConfig(String),
    Credential(String),
}

/// Drives the end-to-end add/remove account flows against the injected
/// capabilities.
///
/// One provisioner per invocation; persisted state is read fresh on every
/// call and nothing is cached across calls.
pub struct AccountProvisioner<P, C, A, S, O, T, Z> {
    pub registry: ProviderRegistry,
    pub prompt: P,
    pub credentials: C,
    pub accounts: A,
    pub server_urls: S,
    pub oauth_configs: O,
    pub tester: T,
    pub authorizer: Z,
}

impl<P, C, A, S, O, T, Z> AccountProvisioner<P, C, A, S, O, T, Z>
where
    P: Prompt,
    C: CredentialStore,
    A: AccountStore,
    S: ServerUrlStore,
    O: OAuthConfigStore,
    T: ConnectionTester,
    Z: Authorizer,
{
    /// Interactively add an account, returning the account on success.
    ///
    /// Every failure at or before the connectivity test leaves the stores
    /// untouched, except that the OAuth branch compensates its two pre-test
    /// writes itself.
    pub async fn add(&mut self) -> DavKitResult<Account> {
        let preset = self.prompt.select_provider(self.registry.presets())?;

        let (provider_id, hint, server_url) = match &preset {
            Some(preset) => {
                let input_url = if preset.server_url.is_empty() {
                    self.prompt.input_server_url(&preset.hint)?
                } else {
                    preset.server_url.clone()
                };
                (
                    preset.id.clone(),
                    preset.hint.clone(),
                    input_url.trim().to_string(),
                )
            }
            None => {
                let input_url = self.prompt.input_server_url("Enter the CalDAV server URL")?;
                (
                    "custom".to_string(),
                    "Enter your password".to_string(),
                    input_url.trim().to_string(),
                )
            }
        };

        let name = self.prompt.input_account_name()?.trim().to_string();
        let username_hint = preset
            .as_ref()
            .and_then(|p| p.username_hint.clone());
        let username = self
            .prompt
            .input_username(username_hint.as_deref())?
            .trim()
            .to_string();

        let endpoints = preset.as_ref().and_then(|p| p.oauth_endpoints()).cloned();

        match endpoints {
            Some(endpoints) => {
                self.add_oauth(endpoints, name, username, server_url, provider_id)
                    .await
            }
            None => {
                self.add_basic(hint, name, username, server_url, provider_id)
                    .await
            }
        }
    }

    async fn add_basic(
        &mut self,
        hint: String,
        name: String,
        username: String,
        server_url: String,
        provider_id: String,
    ) -> DavKitResult<Account> {
        let raw_password = self.prompt.input_password(&hint)?;
        let password = self
            .registry
            .normalize_password(&provider_id, raw_password.trim());

        let params = ConnectionParams {
            server_url: server_url.clone(),
            username: username.clone(),
            password: password.clone(),
            provider_id: provider_id.clone(),
            account_name: name.clone(),
        };
        if let Err(reason) = self.tester.test(&params).await {
            return Err(DavKitError::Connection(reason));
        }

        let account = Account {
            name: name.clone(),
            provider_id,
            username,
        };
        self.credentials.set(&name, &password)?;
        self.accounts.save(&account)?;
        self.server_urls.save(&name, &server_url)?;
        self.set_default_if_first(&name)?;

        Ok(account)
    }

    async fn add_oauth(
        &mut self,
        endpoints: OAuthEndpoints,
        name: String,
        username: String,
        server_url: String,
        provider_id: String,
    ) -> DavKitResult<Account> {
        let client_id = self.prompt.input_client_id()?.trim().to_string();
        let client_secret = self.prompt.input_client_secret()?.trim().to_string();

        let request = AuthorizationRequest {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            authorization_url: endpoints.authorization_url.clone(),
            token_url: endpoints.token_url.clone(),
            scopes: endpoints.scopes.clone(),
        };
        let tokens = self
            .authorizer
            .authorize(&request)
            .await
            .map_err(|failure| DavKitError::Authorization(failure.0))?;

        // The connectivity test authenticates with the refresh token, so the
        // OAuth config and credential must be written before it runs.
        let mut undo = Vec::new();

        let client_config = OAuthClientConfig {
            client_id,
            client_secret,
            token_url: endpoints.token_url.clone(),
        };
        self.oauth_configs.save(&name, &client_config)?;
        undo.push(Undo::OAuthConfig(name.clone()));

        self.credentials.set(&name, &tokens.refresh_token)?;
        undo.push(Undo::Credential(name.clone()));

        let params = ConnectionParams {
            server_url: server_url.clone(),
            username: username.clone(),
            password: tokens.refresh_token.clone(),
            provider_id: provider_id.clone(),
            account_name: name.clone(),
        };
        if let Err(reason) = self.tester.test(&params).await {
            self.compensate(undo)?;
            return Err(DavKitError::Connection(reason));
        }

        let account = Account {
            name: name.clone(),
            provider_id,
            username,
        };
        self.accounts.save(&account)?;
        self.server_urls.save(&name, &server_url)?;
        self.set_default_if_first(&name)?;

        Ok(account)
    }

    /// Remove an account and its stored secrets.
    ///
    /// Credential and OAuth-config deletion are idempotent, so removing a
    /// basic-auth account (which never had an OAuth config) works the same
    /// way.
    pub fn remove(&mut self, name: &str) -> DavKitResult<()> {
        let accounts = self.accounts.load_all()?;
        if !accounts.iter().any(|a| a.name == name) {
            return Err(DavKitError::AccountNotFound(name.to_string()));
        }

        self.credentials.delete(name)?;
        self.oauth_configs.remove(name)?;
        self.accounts.remove(name)?;

        Ok(())
    }

    /// Replay recorded undo actions in reverse order of the forward writes.
    fn compensate(&mut self, undo: Vec<Undo>) -> Result<(), StoreError> {
        for action in undo.into_iter().rev() {
            match action {
                Undo::Credential(name) => self.credentials.delete(&name)?,
                Undo::OAuthConfig(name) => self.oauth_configs.remove(&name)?,
            }
        }
        Ok(())
    }

    /// The very first account ever added becomes the default; later adds
    /// never touch the default.
    fn set_default_if_first(&mut self, name: &str) -> Result<(), StoreError> {
        let accounts = self.accounts.load_all()?;
        if accounts.len() == 1 {
            self.accounts.set_default(name)?;
        }
        Ok(())
    }
}
