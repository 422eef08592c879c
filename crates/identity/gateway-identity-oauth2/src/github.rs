//! GitHub adapter.
//!
//! GitHub deviates from the generic flow in a few places: the token endpoint only
//! returns JSON when asked via `Accept`, and reports failures as HTTP 200 with an
//! `error` field; the REST API rejects requests without a `User-Agent`; and `/user`
//! omits the email when it is private, so the primary verified address has to be
//! read from `/user/emails`.

use crate::client::OAuth2Client;
use crate::config::{OAuth2Config, OAuth2ProviderConfig};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::types::{GitHubEmail, GitHubTokenResponse, GitHubUser};
use async_trait::async_trait;
use gateway_identity_core::{
    AuthorizationRedirect, CallbackParams, FederatedAdapter, IdentityDirectory, IdentityResult,
    PendingAuthorization, ProviderProfile, VerifiedIdentity,
};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, info};

const GITHUB_USER_AGENT: &str = "auth-gateway";
const GITHUB_API_ACCEPT: &str = "application/vnd.github+json";

#[derive(Clone)]
pub struct GitHubAdapter {
    client: OAuth2Client,
    provider_config: OAuth2ProviderConfig,
    directory: Arc<dyn IdentityDirectory>,
}

impl GitHubAdapter {
    pub fn new(
        config: &OAuth2Config,
        provider_config: OAuth2ProviderConfig,
        directory: Arc<dyn IdentityDirectory>,
    ) -> OAuth2Result<Self> {
        if provider_config.userinfo_endpoint.is_none() {
            return Err(OAuth2Error::ConfigError(
                "GitHub adapter needs the /user endpoint".to_string(),
            ));
        }

        Ok(Self {
            client: OAuth2Client::new(config)?,
            provider_config,
            directory,
        })
    }

    fn user_endpoint(&self) -> OAuth2Result<&str> {
        self.provider_config
            .userinfo_endpoint
            .as_deref()
            .ok_or_else(|| OAuth2Error::ConfigError("User endpoint not configured".to_string()))
    }

    async fn exchange_code(&self, code: &str) -> OAuth2Result<String> {
        let response = self
            .client
            .http()
            .post(&self.provider_config.token_endpoint)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.provider_config.client_id.as_str()),
                ("client_secret", self.provider_config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.provider_config.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("GitHub token exchange failed: {}", error_text);
            return Err(OAuth2Error::TokenExchangeFailed(error_text));
        }

        let token_response: GitHubTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::InvalidTokenResponse(e.to_string()))?;

        match token_response {
            GitHubTokenResponse::Success { access_token, .. } => Ok(access_token),
            GitHubTokenResponse::Error {
                error,
                error_description,
            } => {
                error!("GitHub token exchange rejected: {}", error);
                Err(OAuth2Error::TokenExchangeFailed(format!(
                    "{}: {}",
                    error,
                    error_description.unwrap_or_default()
                )))
            }
        }
    }

    async fn api_get<T: DeserializeOwned>(&self, url: &str, access_token: &str) -> OAuth2Result<T> {
        let response = self
            .client
            .http()
            .get(url)
            .header(USER_AGENT, GITHUB_USER_AGENT)
            .header(ACCEPT, GITHUB_API_ACCEPT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("GitHub API request to {} failed: {}", url, error_text);
            return Err(OAuth2Error::UserInfoFailed(error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OAuth2Error::InvalidUserInfoResponse(e.to_string()))
    }

    async fn primary_email(&self, access_token: &str) -> OAuth2Result<String> {
        let emails_endpoint = format!("{}/emails", self.user_endpoint()?.trim_end_matches('/'));
        let emails: Vec<GitHubEmail> = self.api_get(&emails_endpoint, access_token).await?;

        select_primary_email(emails).ok_or(OAuth2Error::MissingEmail)
    }

    async fn fetch_profile(
        &self,
        pending: &PendingAuthorization,
        params: CallbackParams,
    ) -> OAuth2Result<ProviderProfile> {
        let code = self
            .client
            .validate_callback(&self.provider_config, pending, params)?;

        let access_token = self.exchange_code(&code).await?;
        let user: GitHubUser = self.api_get(self.user_endpoint()?, &access_token).await?;

        let email = match user.email.filter(|email| !email.is_empty()) {
            Some(email) => email,
            None => {
                debug!("GitHub user {} has no public email, reading /user/emails", user.id);
                self.primary_email(&access_token).await?
            }
        };

        Ok(ProviderProfile {
            provider_id: self.provider_config.provider_id.clone(),
            subject: user.id.to_string(),
            email,
            display_name: user.name.filter(|name| !name.is_empty()).unwrap_or(user.login),
        })
    }
}

/// The primary address if verified, otherwise any verified address.
fn select_primary_email(emails: Vec<GitHubEmail>) -> Option<String> {
    let mut verified = emails.into_iter().filter(|e| e.verified);
    let first = verified.next()?;
    if first.primary {
        return Some(first.email);
    }

    verified
        .find(|e| e.primary)
        .map(|e| e.email)
        .or(Some(first.email))
}

#[async_trait]
impl FederatedAdapter for GitHubAdapter {
    fn provider_id(&self) -> &str {
        &self.provider_config.provider_id
    }

    fn begin(&self) -> IdentityResult<AuthorizationRedirect> {
        Ok(self.client.authorization_redirect(&self.provider_config)?)
    }

    async fn complete(
        &self,
        pending: PendingAuthorization,
        params: CallbackParams,
    ) -> IdentityResult<VerifiedIdentity> {
        let profile = self.fetch_profile(&pending, params).await?;

        info!("Verified GitHub profile, registering with downstream");

        self.directory.sign_provider(&profile).await
    }
}
