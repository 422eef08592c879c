//! Shared application state, wired once at startup.

use crate::config::GatewayConfig;
use anyhow::{Context, Result};
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use gateway_downstream::{DownstreamClient, DownstreamConfig};
use gateway_identity_core::IdentityDirectory;
use gateway_identity_local::DirectoryCredentialVerifier;
use gateway_identity_oauth2::{
    GITHUB_PROVIDER_ID, GOOGLE_PROVIDER_ID, GitHubAdapter, OAuth2Adapter, OAuth2Config,
    OAuth2ProviderConfig,
};
use gateway_identity_session::{
    Authenticator, SessionCookieIssuer, Strategy, StrategyRegistry,
};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Name under which the identifier/secret strategy is registered.
pub const LOCAL_STRATEGY: &str = "basic";

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub downstream: DownstreamClient,
    pub dev_mode: bool,
    cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    pub fn new(
        authenticator: Authenticator,
        downstream: DownstreamClient,
        session_secret: &str,
        dev_mode: bool,
    ) -> Self {
        Self {
            authenticator,
            downstream,
            dev_mode,
            cookie_key: derive_cookie_key(session_secret),
        }
    }

    /// Build the downstream client, the strategy registry and the authenticator.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let downstream = DownstreamClient::new(DownstreamConfig {
            api_url: config.downstream.api_url.clone(),
            api_key_token: config.downstream.api_key_token.clone(),
            timeout: Duration::from_secs(config.downstream.timeout_seconds),
        })
        .context("Failed to create downstream client")?;
        let directory: Arc<dyn IdentityDirectory> = Arc::new(downstream.clone());

        let mut registry = StrategyRegistry::new();
        registry.register(
            LOCAL_STRATEGY,
            Strategy::Local(Arc::new(DirectoryCredentialVerifier::new(directory.clone()))),
        )?;

        let oauth2_config = OAuth2Config::new()
            .with_state_ttl(config.oauth2.state_ttl_seconds)
            .with_http_timeout(config.oauth2.http_timeout_seconds);

        match config.oauth2.google.pair() {
            Some((client_id, client_secret)) => {
                let provider = OAuth2ProviderConfig::google(
                    client_id.to_string(),
                    client_secret.to_string(),
                    config.callback_url(GOOGLE_PROVIDER_ID),
                );
                let adapter = OAuth2Adapter::new(&oauth2_config, provider, directory.clone())
                    .context("Failed to create Google adapter")?;
                registry.register(GOOGLE_PROVIDER_ID, Strategy::Federated(Arc::new(adapter)))?;
            }
            None => warn!("Google credentials not configured, /auth/google is disabled"),
        }

        match config.oauth2.github.pair() {
            Some((client_id, client_secret)) => {
                let provider = OAuth2ProviderConfig::github(
                    client_id.to_string(),
                    client_secret.to_string(),
                    config.callback_url(GITHUB_PROVIDER_ID),
                );
                let adapter = GitHubAdapter::new(&oauth2_config, provider, directory)
                    .context("Failed to create GitHub adapter")?;
                registry.register(GITHUB_PROVIDER_ID, Strategy::Federated(Arc::new(adapter)))?;
            }
            None => warn!("GitHub credentials not configured, /auth/github is disabled"),
        }

        info!("Registered strategies: {:?}", registry.names());

        let issuer = SessionCookieIssuer::new(config.server.dev)
            .with_remember_me_ttl(time::Duration::seconds(config.session.remember_me_ttl_seconds))
            .with_standard_ttl(time::Duration::seconds(config.session.standard_ttl_seconds));

        Ok(Self::new(
            Authenticator::new(Arc::new(registry), issuer),
            downstream,
            &config.session.secret,
            config.server.dev,
        ))
    }
}

/// 64-byte signing key for the OAuth2 state cookie.
fn derive_cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
