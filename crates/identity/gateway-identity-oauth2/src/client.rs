//! OAuth2 client implementation with PKCE support.

use crate::config::{OAuth2Config, OAuth2ProviderConfig};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::types::{TokenResponse, UserInfoResponse};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use gateway_identity_core::{AuthorizationRedirect, CallbackParams, PendingAuthorization};
use rand::{Rng, thread_rng};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;
use uuid::Uuid;

/// PKCE code challenge and verifier
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

impl Default for PkceChallenge {
    fn default() -> Self {
        Self::new()
    }
}

impl PkceChallenge {
    /// Generate a new PKCE challenge
    pub fn new() -> Self {
        let code_verifier = Self::generate_code_verifier();
        let code_challenge = Self::generate_code_challenge(&code_verifier);

        Self {
            code_verifier,
            code_challenge,
            code_challenge_method: "S256".to_string(),
        }
    }

    fn generate_code_verifier() -> String {
        let mut rng = thread_rng();
        let bytes: Vec<u8> = (0..64).map(|_| rng.r#gen::<u8>()).collect();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub(crate) fn generate_code_challenge(verifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// HTTP side of the authorization-code flow, shared by every adapter.
#[derive(Clone)]
pub struct OAuth2Client {
    http_client: Client,
    state_ttl_seconds: u64,
}

impl OAuth2Client {
    pub fn new(config: &OAuth2Config) -> OAuth2Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| OAuth2Error::ConfigError(e.to_string()))?;

        Ok(Self {
            http_client,
            state_ttl_seconds: config.state_ttl_seconds,
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http_client
    }

    /// Build the provider authorization URL and the pending state for its callback.
    pub fn authorization_redirect(
        &self,
        provider_config: &OAuth2ProviderConfig,
    ) -> OAuth2Result<AuthorizationRedirect> {
        let mut url = Url::parse(&provider_config.authorization_endpoint)?;

        let pkce = provider_config.use_pkce.then(PkceChallenge::new);

        let pending = PendingAuthorization::new(
            Uuid::new_v4().to_string(),
            provider_config.provider_id.clone(),
            pkce.as_ref().map(|p| p.code_verifier.clone()),
            self.state_ttl_seconds,
        )
        .ok_or_else(|| {
            OAuth2Error::ConfigError(format!(
                "state TTL of {} seconds is out of range",
                self.state_ttl_seconds
            ))
        })?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("response_type", "code");
            params.append_pair("client_id", &provider_config.client_id);
            params.append_pair("redirect_uri", &provider_config.redirect_uri);
            params.append_pair("state", &pending.state);

            if !provider_config.scopes.is_empty() {
                params.append_pair("scope", &provider_config.scopes.join(" "));
            }

            if let Some(pkce) = &pkce {
                params.append_pair("code_challenge", &pkce.code_challenge);
                params.append_pair("code_challenge_method", &pkce.code_challenge_method);
            }

            for (key, value) in &provider_config.auth_params {
                params.append_pair(key, value);
            }
        }

        debug!(
            "Generated authorization URL for provider {}",
            provider_config.provider_id
        );

        Ok(AuthorizationRedirect {
            url: url.to_string(),
            pending,
        })
    }

    /// Check the callback against the pending state and return the authorization code.
    pub fn validate_callback(
        &self,
        provider_config: &OAuth2ProviderConfig,
        pending: &PendingAuthorization,
        params: CallbackParams,
    ) -> OAuth2Result<String> {
        if pending.provider_id != provider_config.provider_id {
            return Err(OAuth2Error::InvalidState);
        }

        if params.state.as_deref() != Some(pending.state.as_str()) {
            return Err(OAuth2Error::InvalidState);
        }

        if pending.is_expired() {
            return Err(OAuth2Error::StateExpired);
        }

        if let Some(error) = params.error {
            let error_desc = params
                .error_description
                .unwrap_or_else(|| "No description".to_string());
            return Err(OAuth2Error::CallbackError(format!("{}: {}", error, error_desc)));
        }

        params
            .code
            .filter(|code| !code.is_empty())
            .ok_or(OAuth2Error::MissingAuthorizationCode)
    }

    /// Exchange authorization code for tokens
    pub async fn exchange_code(
        &self,
        provider_config: &OAuth2ProviderConfig,
        code: &str,
        code_verifier: Option<&str>,
    ) -> OAuth2Result<TokenResponse> {
        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("client_id", &provider_config.client_id);
        params.insert("client_secret", &provider_config.client_secret);
        params.insert("redirect_uri", &provider_config.redirect_uri);

        if let Some(verifier) = code_verifier {
            params.insert("code_verifier", verifier);
        }

        let response = self
            .http_client
            .post(&provider_config.token_endpoint)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Token exchange failed: {}", error_text);
            return Err(OAuth2Error::TokenExchangeFailed(error_text));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::InvalidTokenResponse(e.to_string()))?;

        info!(
            "Exchanged authorization code for provider {}",
            provider_config.provider_id
        );
        Ok(token_response)
    }

    /// Get user info using access token
    pub async fn get_user_info(
        &self,
        provider_config: &OAuth2ProviderConfig,
        access_token: &str,
    ) -> OAuth2Result<UserInfoResponse> {
        let userinfo_endpoint = provider_config.userinfo_endpoint.as_ref().ok_or_else(|| {
            OAuth2Error::ConfigError("User info endpoint not configured".to_string())
        })?;

        let response = self
            .http_client
            .get(userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("User info request failed: {}", error_text);
            return Err(OAuth2Error::UserInfoFailed(error_text));
        }

        let user_info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::InvalidUserInfoResponse(e.to_string()))?;

        debug!(
            "Successfully retrieved user info for subject: {}",
            user_info.sub
        );
        Ok(user_info)
    }
}
