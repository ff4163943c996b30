//! The `davkit account` subcommands, wiring concrete adapters into the
//! provisioning core.

use anyhow::Result;
use owo_colors::OwoColorize;

use davkit_core::ports::AccountStore;
use davkit_core::{AccountProvisioner, ProviderRegistry};
use davkit_oauth::LocalServerAuthorizer;

use crate::caldav::CalDavTester;
use crate::keychain::{KeyringCredentials, KeyringOAuthConfigs};
use crate::prompt::TerminalPrompt;
use crate::render;
use crate::store::JsonConfigStore;

type CliProvisioner = AccountProvisioner<
    TerminalPrompt,
    KeyringCredentials,
    JsonConfigStore,
    JsonConfigStore,
    KeyringOAuthConfigs,
    CalDavTester,
    LocalServerAuthorizer,
>;

fn provisioner() -> Result<CliProvisioner> {
    Ok(AccountProvisioner {
        registry: ProviderRegistry::builtin(),
        prompt: TerminalPrompt,
        credentials: KeyringCredentials,
        accounts: JsonConfigStore::at_default_location()?,
        server_urls: JsonConfigStore::at_default_location()?,
        oauth_configs: KeyringOAuthConfigs,
        tester: CalDavTester::new(ProviderRegistry::builtin(), KeyringOAuthConfigs),
        authorizer: LocalServerAuthorizer::new(),
    })
}

pub async fn add() -> Result<()> {
    let mut provisioner = provisioner()?;
    let account = provisioner.add().await?;

    println!(
        "{}",
        format!("Account \"{}\" added successfully.", account.name).green()
    );
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let mut provisioner = provisioner()?;
    provisioner.remove(name)?;

    println!("Account \"{name}\" removed.");
    Ok(())
}

pub fn list(json: bool) -> Result<()> {
    let store = JsonConfigStore::at_default_location()?;
    let accounts = store.load_all()?;
    let default = store.get_default()?;

    if json {
        let rendered = render::accounts_json(&accounts, default.as_deref());
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("{}", render::accounts_table(&accounts, default.as_deref()));
    }

    Ok(())
}
