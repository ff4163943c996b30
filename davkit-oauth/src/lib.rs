//! Local-server OAuth2 authorization for davkit.
//!
//! Implements the authorization-code flow with PKCE: a code verifier and
//! challenge are generated, an ephemeral HTTP listener on 127.0.0.1 catches
//! the provider's redirect, and the resulting code is exchanged for tokens.

pub mod browser;
pub mod error;
pub mod exchange;
pub mod flow;
pub mod listener;
pub mod pkce;

pub use error::OAuthError;
pub use flow::LocalServerAuthorizer;
pub use pkce::PkceChallenge;
