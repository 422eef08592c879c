//! Standards-compliant authorization-code adapter.

use crate::client::OAuth2Client;
use crate::config::{OAuth2Config, OAuth2ProviderConfig};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::types::UserInfoResponse;
use async_trait::async_trait;
use gateway_identity_core::{
    AuthorizationRedirect, CallbackParams, FederatedAdapter, IdentityDirectory, IdentityResult,
    PendingAuthorization, ProviderProfile, VerifiedIdentity,
};
use std::sync::Arc;
use tracing::info;

/// Adapter for any provider that follows the OAuth2 code flow and exposes an
/// OpenID-style userinfo endpoint. Configured for Google by
/// [`OAuth2ProviderConfig::google`].
#[derive(Clone)]
pub struct OAuth2Adapter {
    client: OAuth2Client,
    provider_config: OAuth2ProviderConfig,
    directory: Arc<dyn IdentityDirectory>,
}

impl OAuth2Adapter {
    pub fn new(
        config: &OAuth2Config,
        provider_config: OAuth2ProviderConfig,
        directory: Arc<dyn IdentityDirectory>,
    ) -> OAuth2Result<Self> {
        if provider_config.userinfo_endpoint.is_none() {
            return Err(OAuth2Error::ConfigError(format!(
                "Provider '{}' has no userinfo endpoint",
                provider_config.provider_id
            )));
        }

        Ok(Self {
            client: OAuth2Client::new(config)?,
            provider_config,
            directory,
        })
    }

    async fn fetch_profile(
        &self,
        pending: &PendingAuthorization,
        params: CallbackParams,
    ) -> OAuth2Result<ProviderProfile> {
        let code = self
            .client
            .validate_callback(&self.provider_config, pending, params)?;

        let token_response = self
            .client
            .exchange_code(&self.provider_config, &code, pending.code_verifier.as_deref())
            .await?;

        let user_info = self
            .client
            .get_user_info(&self.provider_config, &token_response.access_token)
            .await?;

        self.map_user_info_to_profile(user_info)
    }

    /// Normalize the userinfo payload, honouring a custom field mapping if configured.
    fn map_user_info_to_profile(&self, user_info: UserInfoResponse) -> OAuth2Result<ProviderProfile> {
        let claim = |field: &Option<String>| {
            field
                .as_ref()
                .and_then(|field| user_info.additional_claims.get(field))
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        let (subject, email, name) = match &self.provider_config.user_info_mapping {
            Some(mapping) => (
                claim(&mapping.subject_field).unwrap_or_else(|| user_info.sub.clone()),
                claim(&mapping.email_field).or_else(|| user_info.email.clone()),
                claim(&mapping.name_field).or_else(|| user_info.name.clone()),
            ),
            None => (
                user_info.sub.clone(),
                user_info.email.clone(),
                user_info.name.clone(),
            ),
        };

        if user_info.email_verified == Some(false) {
            return Err(OAuth2Error::UnverifiedEmail);
        }

        let email = email
            .filter(|email| !email.is_empty())
            .ok_or(OAuth2Error::MissingEmail)?;

        Ok(ProviderProfile {
            provider_id: self.provider_config.provider_id.clone(),
            subject,
            display_name: name.unwrap_or_else(|| email.clone()),
            email,
        })
    }
}

#[async_trait]
impl FederatedAdapter for OAuth2Adapter {
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

        info!(
            "Verified {} profile, registering with downstream",
            profile.provider_id
        );

        self.directory.sign_provider(&profile).await
    }
}
