//! reqwest-backed client for the downstream API.

use crate::error::{DownstreamError, DownstreamResult};
use crate::types::{
    AuthResponse, ForwardRequest, ForwardedResponse, SignInRequest, SignProviderRequest,
};
use async_trait::async_trait;
use gateway_identity_core::{
    Credential, IdentityDirectory, IdentityResult, ProviderProfile, VerifiedIdentity,
};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

const SIGN_IN_PATH: &str = "/api/auth/sign-in";
const SIGN_UP_PATH: &str = "/api/auth/sign-up";
const SIGN_PROVIDER_PATH: &str = "/api/auth/sign-provider";

#[derive(Debug, Clone)]
pub struct DownstreamConfig {
    /// Base URL of the downstream API, e.g. `http://localhost:3000`.
    pub api_url: String,
    /// Pre-shared application key sent with identity calls.
    pub api_key_token: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct DownstreamClient {
    http_client: Client,
    base_url: String,
    api_key_token: String,
}

impl DownstreamClient {
    pub fn new(config: DownstreamConfig) -> DownstreamResult<Self> {
        let parsed = Url::parse(&config.api_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownstreamError::ConfigError(format!(
                "unsupported scheme '{}' in api url",
                parsed.scheme()
            )));
        }

        if config.api_key_token.is_empty() {
            return Err(DownstreamError::ConfigError(
                "api key token must not be empty".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DownstreamError::ConfigError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key_token: config.api_key_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_auth_response(response: Response) -> DownstreamResult<AuthResponse> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DownstreamError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        AuthResponse::parse(&body)
    }

    async fn request_sign_in(&self, credential: &Credential) -> DownstreamResult<VerifiedIdentity> {
        let response = self
            .http_client
            .post(self.endpoint(SIGN_IN_PATH))
            .basic_auth(&credential.identifier, Some(&credential.secret))
            .json(&SignInRequest {
                api_key_token: &self.api_key_token,
            })
            .send()
            .await?;

        Self::read_auth_response(response).await?.into_identity()
    }

    async fn request_sign_provider(
        &self,
        profile: &ProviderProfile,
    ) -> DownstreamResult<VerifiedIdentity> {
        let response = self
            .http_client
            .post(self.endpoint(SIGN_PROVIDER_PATH))
            .json(&SignProviderRequest {
                name: &profile.display_name,
                email: &profile.email,
                password: &profile.subject,
                api_key_token: &self.api_key_token,
                email_verified: true,
            })
            .send()
            .await?;

        Self::read_auth_response(response).await?.into_identity()
    }

    /// Register a new local account. The caller's body is forwarded verbatim.
    pub async fn sign_up(&self, user: Value) -> DownstreamResult<ForwardedResponse> {
        self.forward(ForwardRequest::new(reqwest::Method::POST, SIGN_UP_PATH).with_body(user))
            .await
    }

    /// Relay a request to the downstream API, attaching the bearer token if present.
    pub async fn forward(&self, request: ForwardRequest) -> DownstreamResult<ForwardedResponse> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), self.endpoint(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!(
            "Forwarded {} {} -> {}",
            request.method, request.path, status
        );

        Ok(ForwardedResponse { status, body })
    }
}

#[async_trait]
impl IdentityDirectory for DownstreamClient {
    async fn sign_in(&self, credential: &Credential) -> IdentityResult<VerifiedIdentity> {
        self.request_sign_in(credential).await.map_err(|e| {
            match &e {
                DownstreamError::Rejected { status, .. } => {
                    debug!("Downstream rejected sign-in with status {}", status)
                }
                _ => error!("Downstream sign-in failed: {}", e),
            }
            e.into_credential_error()
        })
    }

    async fn sign_provider(&self, profile: &ProviderProfile) -> IdentityResult<VerifiedIdentity> {
        self.request_sign_provider(profile)
            .await
            .map(|identity| identity.with_provider(profile.provider_id.clone()))
            .map_err(|e| {
                match &e {
                    DownstreamError::Rejected { status, .. } => warn!(
                        "Downstream rejected sign-provider for {} with status {}",
                        profile.provider_id, status
                    ),
                    _ => error!("Downstream sign-provider failed: {}", e),
                }
                e.into_provider_error()
            })
    }
}
