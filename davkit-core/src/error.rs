//! Error types for the davkit ecosystem.

use thiserror::Error;

/// Errors that can occur while provisioning or removing accounts.
///
/// The `Connection` and `Authorization` variants carry the user-facing
/// phase prefix in their display form so callers can print them as-is.
#[derive(Error, Debug)]
pub enum DavKitError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("OAuth authorization failed: {0}")]
    Authorization(String),

    #[error("Account \"{0}\" not found.")]
    AccountNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for davkit operations.
pub type DavKitResult<T> = Result<T, DavKitError>;

/// Failure from one of the persisted stores (keychain, config file).
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        StoreError(msg.into())
    }
}

impl From<StoreError> for DavKitError {
    fn from(err: StoreError) -> Self {
        DavKitError::Storage(err.0)
    }
}

/// Failure while prompting the user for input.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct PromptError(pub String);

impl From<PromptError> for DavKitError {
    fn from(err: PromptError) -> Self {
        DavKitError::Prompt(err.0)
    }
}
