//! Error types for the OAuth authorization flow.

use thiserror::Error;

/// Errors that can occur during a local-server OAuth authorization.
///
/// None of these are retried; a retry means the user re-runs the whole
/// add-account flow.
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("Failed to allocate a local callback port: {0}")]
    PortAllocation(#[source] std::io::Error),

    #[error("Callback listener failed: {0}")]
    Listener(#[source] std::io::Error),

    #[error("Authorization was denied: {0}")]
    Denied(String),

    #[error("Timed out waiting for the authorization redirect ({0}s)")]
    Timeout(u64),

    #[error("Failed to open browser: {0}")]
    Browser(String),

    #[error("Invalid authorization URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token exchange failed ({status}): {body}")]
    Exchange { status: u16, body: String },

    #[error("No refresh token received. Ensure the OAuth consent screen requests offline access.")]
    MissingRefreshToken,
}
