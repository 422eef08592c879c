//! Federated strategy adapters.
//!
//! Two adapters share one contract ([`FederatedAdapter`]): [`OAuth2Adapter`] runs a
//! standards-compliant authorization-code flow with PKCE (Google by default), and
//! [`GitHubAdapter`] handles GitHub's token exchange and email lookup quirks. Both
//! normalize the provider profile and register it with the downstream identity API
//! through an [`IdentityDirectory`](gateway_identity_core::IdentityDirectory).

mod client;
mod config;
mod error;
mod generic;
mod github;
mod types;


pub use client::{OAuth2Client, PkceChallenge};
pub use config::{
    GITHUB_PROVIDER_ID, GOOGLE_PROVIDER_ID, OAuth2Config, OAuth2ProviderConfig, UserInfoMapping,
};
pub use error::{OAuth2Error, OAuth2Result};
pub use generic::OAuth2Adapter;
pub use github::GitHubAdapter;
pub use types::{TokenResponse, UserInfoResponse};

// Re-export common types for convenience
pub use gateway_identity_core::{FederatedAdapter, VerifiedIdentity};
