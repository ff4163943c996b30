//! Terminal prompting via dialoguer and rpassword.

use dialoguer::{Input, Select};

use davkit_core::error::PromptError;
use davkit_core::ports::Prompt;
use davkit_core::provider::ProviderPreset;

/// Interactive prompts on the controlling terminal.
///
/// Required fields are enforced here, so the provisioning core never sees an
/// empty answer.
pub struct TerminalPrompt;

fn prompt_failed(err: dialoguer::Error) -> PromptError {
    PromptError(format!("Failed to read input: {err}"))
}

impl TerminalPrompt {
    fn required_input(&self, label: &str) -> Result<String, PromptError> {
        Input::new()
            .with_prompt(label)
            .validate_with(|value: &String| {
                if value.trim().is_empty() {
                    Err("A value is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(prompt_failed)
    }

    fn required_secret(&self, label: &str) -> Result<String, PromptError> {
        loop {
            let secret = rpassword::prompt_password(format!("{label}: "))
                .map_err(|err| PromptError(format!("Failed to read secret input: {err}")))?;
            if !secret.trim().is_empty() {
                return Ok(secret);
            }
            eprintln!("A value is required.");
        }
    }
}

impl Prompt for TerminalPrompt {
    fn select_provider(
        &self,
        presets: &[ProviderPreset],
    ) -> Result<Option<ProviderPreset>, PromptError> {
        let mut items: Vec<&str> = presets.iter().map(|p| p.display_name.as_str()).collect();
        items.push("Other (custom CalDAV server)");

        let choice = Select::new()
            .with_prompt("Select your calendar provider")
            .items(&items)
            .default(0)
            .interact()
            .map_err(prompt_failed)?;

        // The last item is the custom-provider escape hatch.
        Ok(presets.get(choice).cloned())
    }

    fn input_server_url(&self, hint: &str) -> Result<String, PromptError> {
        println!("{hint}");
        self.required_input("Server URL")
    }

    fn input_account_name(&self) -> Result<String, PromptError> {
        self.required_input("Account name (a label of your choice)")
    }

    fn input_username(&self, hint: Option<&str>) -> Result<String, PromptError> {
        match hint {
            Some(hint) => self.required_input(&format!("Username ({hint})")),
            None => self.required_input("Username"),
        }
    }

    fn input_password(&self, hint: &str) -> Result<String, PromptError> {
        println!("{hint}");
        self.required_secret("Password")
    }

    fn input_client_id(&self) -> Result<String, PromptError> {
        self.required_input("OAuth client ID")
    }

    fn input_client_secret(&self) -> Result<String, PromptError> {
        self.required_secret("OAuth client secret")
    }
}
