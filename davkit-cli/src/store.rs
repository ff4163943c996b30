//! JSON config file backing the account and server-URL registries.
//!
//! One physical file (`~/.config/davkit/config.json`) exposes two separate
//! capabilities; each operation reads the file fresh and writes it back
//! whole, so nothing is cached between calls.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use davkit_core::Account;
use davkit_core::error::StoreError;
use davkit_core::ports::{AccountStore, ServerUrlStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default, rename = "serverUrls")]
    server_urls: BTreeMap<String, String>,
    #[serde(default, rename = "defaultAccount", skip_serializing_if = "Option::is_none")]
    default_account: Option<String>,
}

/// File-backed store for accounts and per-account server URLs.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: PathBuf) -> Self {
        JsonConfigStore { path }
    }

    /// The store at `~/.config/davkit/config.json`.
    pub fn at_default_location() -> Result<Self, StoreError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| StoreError::new("Could not determine config directory"))?
            .join("davkit");
        Ok(JsonConfigStore::new(config_dir.join("config.json")))
    }

    /// A missing or unreadable file reads as an empty config.
    fn read(&self) -> ConfigFile {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write(&self, config: &ConfigFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                StoreError::new(format!(
                    "Failed to create directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let contents = serde_json::to_string_pretty(config)
            .map_err(|err| StoreError::new(format!("Failed to serialize config: {err}")))?;

        std::fs::write(&self.path, contents).map_err(|err| {
            StoreError::new(format!("Failed to write {}: {err}", self.path.display()))
        })?;

        // Owner-only since the file names accounts and servers.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).map_err(
                |err| {
                    StoreError::new(format!(
                        "Failed to set permissions on {}: {err}",
                        self.path.display()
                    ))
                },
            )?;
        }

        Ok(())
    }
}

impl AccountStore for JsonConfigStore {
    fn load_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.read().accounts)
    }

    fn save(&mut self, account: &Account) -> Result<(), StoreError> {
        let mut config = self.read();
        match config.accounts.iter_mut().find(|a| a.name == account.name) {
            Some(existing) => *existing = account.clone(),
            None => config.accounts.push(account.clone()),
        }
        self.write(&config)
    }

    /// Removing an account also drops its server URL, and the default moves
    /// to the first remaining account if the removed one held it.
    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        let mut config = self.read();
        config.accounts.retain(|a| a.name != name);
        config.server_urls.remove(name);
        if config.default_account.as_deref() == Some(name) {
            config.default_account = config.accounts.first().map(|a| a.name.clone());
        }
        self.write(&config)
    }

    fn get_default(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read().default_account)
    }

    fn set_default(&mut self, name: &str) -> Result<(), StoreError> {
        let mut config = self.read();
        config.default_account = Some(name.to_string());
        self.write(&config)
    }
}

impl ServerUrlStore for JsonConfigStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read().server_urls.get(name).cloned())
    }

    fn save(&mut self, name: &str, url: &str) -> Result<(), StoreError> {
        let mut config = self.read();
        config.server_urls.insert(name.to_string(), url.to_string());
        self.write(&config)
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        let mut config = self.read();
        config.server_urls.remove(name);
        self.write(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonConfigStore {
        JsonConfigStore::new(dir.path().join("config.json"))
    }

    fn account(name: &str) -> Account {
        Account {
            name: name.to_string(),
            provider_id: "icloud".to_string(),
            username: format!("{name}@example.com"),
        }
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        assert!(store.load_all().expect("load").is_empty());
        assert!(store.get_default().expect("default").is_none());
        assert!(ServerUrlStore::get(&store, "work").expect("url").is_none());
    }

    #[test]
    fn test_save_is_an_upsert_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);

        AccountStore::save(&mut store, &account("work")).expect("save");
        let mut updated = account("work");
        updated.username = "new@example.com".to_string();
        AccountStore::save(&mut store, &updated).expect("save again");
        AccountStore::save(&mut store, &account("home")).expect("save other");

        let accounts = store.load_all().expect("load");
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].username, "new@example.com");
    }

    #[test]
    fn test_remove_drops_server_url_and_reassigns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);

        AccountStore::save(&mut store, &account("work")).expect("save");
        AccountStore::save(&mut store, &account("home")).expect("save");
        ServerUrlStore::save(&mut store, "work", "https://dav.example.com").expect("url");
        store.set_default("work").expect("default");

        AccountStore::remove(&mut store, "work").expect("remove");

        assert_eq!(store.load_all().expect("load").len(), 1);
        assert!(ServerUrlStore::get(&store, "work").expect("url").is_none());
        assert_eq!(store.get_default().expect("default").as_deref(), Some("home"));
    }

    #[test]
    fn test_remove_keeps_default_of_other_account() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);

        AccountStore::save(&mut store, &account("work")).expect("save");
        AccountStore::save(&mut store, &account("home")).expect("save");
        store.set_default("home").expect("default");

        AccountStore::remove(&mut store, "work").expect("remove");

        assert_eq!(store.get_default().expect("default").as_deref(), Some("home"));
    }

    #[test]
    fn test_server_urls_roundtrip_independently_of_accounts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);

        ServerUrlStore::save(&mut store, "work", "https://cloud.example.com/dav").expect("save");
        assert_eq!(
            ServerUrlStore::get(&store, "work").expect("get").as_deref(),
            Some("https://cloud.example.com/dav")
        );

        ServerUrlStore::remove(&mut store, "work").expect("remove");
        ServerUrlStore::remove(&mut store, "work").expect("idempotent remove");
        assert!(ServerUrlStore::get(&store, "work").expect("get").is_none());
    }

    #[test]
    fn test_two_handles_share_the_same_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut accounts_handle = store_in(&dir);
        let urls_handle = store_in(&dir);

        AccountStore::save(&mut accounts_handle, &account("work")).expect("save");
        assert!(urls_handle.load_all().expect("load").iter().any(|a| a.name == "work"));
    }

    #[cfg(unix)]
    #[test]
    fn test_config_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        AccountStore::save(&mut store, &account("work")).expect("save");

        let mode = std::fs::metadata(dir.path().join("config.json"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
