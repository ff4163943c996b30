//! Terminal rendering of configured accounts.

use owo_colors::OwoColorize;

use davkit_core::Account;

/// Aligned table of accounts, with the default account marked.
pub fn accounts_table(accounts: &[Account], default: Option<&str>) -> String {
    if accounts.is_empty() {
        return "No accounts configured. Run `davkit account add` to connect one.".to_string();
    }

    let name_width = accounts
        .iter()
        .map(|a| a.name.len())
        .chain(["NAME".len()])
        .max()
        .unwrap_or(0);
    let provider_width = accounts
        .iter()
        .map(|a| a.provider_id.len())
        .chain(["PROVIDER".len()])
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!(
        "  {:name_width$}  {:provider_width$}  USERNAME",
        "NAME", "PROVIDER"
    )];

    for account in accounts {
        let marker = if default == Some(account.name.as_str()) {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        lines.push(format!(
            "{marker} {:name_width$}  {:provider_width$}  {}",
            account.name, account.provider_id, account.username
        ));
    }

    lines.join("\n")
}

/// JSON rendering of accounts with an explicit default flag per entry.
pub fn accounts_json(accounts: &[Account], default: Option<&str>) -> serde_json::Value {
    serde_json::json!(
        accounts
            .iter()
            .map(|a| {
                serde_json::json!({
                    "name": a.name,
                    "providerId": a.provider_id,
                    "username": a.username,
                    "default": default == Some(a.name.as_str()),
                })
            })
            .collect::<Vec<_>>()
    )
}
