//! Wire types of the downstream API.

use gateway_identity_core::{SessionToken, VerifiedIdentity};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DownstreamError, DownstreamResult};

/// Body sent to `sign-in` alongside the Basic credentials.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest<'a> {
    pub api_key_token: &'a str,
}

/// Body sent to `sign-provider`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignProviderRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    /// The provider subject id; stable across logins, so the downstream maps the
    /// same subject to the same account.
    pub password: &'a str,
    pub api_key_token: &'a str,
    pub email_verified: bool,
}

/// `{token, user: {id, name, email}}` as returned by `sign-in` and `sign-provider`.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthUser {
    #[serde(alias = "_id")]
    pub id: Value,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl AuthResponse {
    pub fn parse(body: &str) -> DownstreamResult<Self> {
        serde_json::from_str(body).map_err(|e| DownstreamError::UnexpectedShape(e.to_string()))
    }

    pub fn into_identity(self) -> DownstreamResult<VerifiedIdentity> {
        if self.token.is_empty() {
            return Err(DownstreamError::UnexpectedShape("empty token".to_string()));
        }

        let user_id = match self.user.id {
            Value::String(id) if !id.is_empty() => id,
            Value::Number(id) => id.to_string(),
            other => {
                return Err(DownstreamError::UnexpectedShape(format!(
                    "invalid user id: {}",
                    other
                )));
            }
        };

        let mut identity = VerifiedIdentity::new(SessionToken::new(self.token), user_id)
            .with_email(self.user.email)
            .with_display_name(self.user.name);

        for (key, value) in self.user.extra {
            identity = identity.with_claim(key, value);
        }

        Ok(identity)
    }
}

/// A request relayed through the generic authorized-request channel.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl ForwardRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Downstream status and body, relayed as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedResponse {
    pub status: u16,
    pub body: Value,
}

impl ForwardedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
