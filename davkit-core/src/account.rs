//! Configured calendar accounts.

use serde::{Deserialize, Serialize};

/// A configured calendar account.
///
/// `name` is the user-chosen label and the key under which the account's
/// credential, server URL and OAuth config are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub username: String,
}
