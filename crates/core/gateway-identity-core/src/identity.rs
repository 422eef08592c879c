use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque bearer token issued by the downstream identity API.
///
/// Never serialized and redacted from `Debug`; it leaves the gateway only through
/// the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Outcome of a successful authentication by exactly one strategy.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub token: SessionToken,
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider_id: Option<String>,
    pub claims: Map<String, Value>,
}

impl VerifiedIdentity {
    pub fn new(token: SessionToken, user_id: impl Into<String>) -> Self {
        Self {
            token,
            user_id: user_id.into(),
            email: None,
            display_name: None,
            provider_id: None,
            claims: Map::new(),
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    /// Split into the bearer token and the claims that may be sent in a body.
    pub fn into_parts(self) -> (SessionToken, IdentityClaims) {
        let mut claims = self.claims;
        for reserved in ["token", "userId", "email", "displayName", "provider"] {
            claims.remove(reserved);
        }

        (
            self.token,
            IdentityClaims {
                user_id: self.user_id,
                email: self.email,
                display_name: self.display_name,
                provider: self.provider_id,
                claims,
            },
        )
    }
}

/// The non-secret part of a [`VerifiedIdentity`], returned as the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}
