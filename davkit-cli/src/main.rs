mod caldav;
mod commands;
mod keychain;
mod prompt;
mod render;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "davkit")]
#[command(about = "Connect CalDAV calendar accounts and manage their credentials")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage calendar accounts
    #[command(subcommand)]
    Account(AccountCommands),
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Connect a new calendar account
    Add,
    /// Remove an account and its stored credentials
    Remove {
        /// The account's name (label chosen when it was added)
        name: String,
    },
    /// List configured accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Account(AccountCommands::Add) => commands::accounts::add().await,
        Commands::Account(AccountCommands::Remove { name }) => commands::accounts::remove(&name),
        Commands::Account(AccountCommands::List { json }) => commands::accounts::list(json),
    }
}
