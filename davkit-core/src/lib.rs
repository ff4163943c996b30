//! Core types for the davkit ecosystem.
//!
//! This crate provides the pieces shared by the davkit CLI and its adapters:
//! - `Account` and related entities for configured calendar accounts
//! - `provider` module with the built-in provider preset catalog
//! - `ports` module with the capabilities the provisioning core consumes
//! - `provisioning` module with the add/remove account orchestration

pub mod account;
pub mod error;
pub mod ports;
pub mod provider;
pub mod provisioning;

pub use account::Account;
pub use error::{DavKitError, DavKitResult};
pub use provider::{AuthMethod, OAuthEndpoints, ProviderPreset, ProviderRegistry};
pub use provisioning::AccountProvisioner;
