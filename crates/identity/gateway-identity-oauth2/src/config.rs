//! OAuth2 configuration types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const GOOGLE_PROVIDER_ID: &str = "google";
pub const GITHUB_PROVIDER_ID: &str = "github";

/// OAuth2 provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2ProviderConfig {
    pub provider_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: Option<String>,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Additional parameters to include in authorization request
    pub auth_params: HashMap<String, String>,
    /// Whether to use PKCE (recommended for public clients)
    pub use_pkce: bool,
    /// Custom user info mapping
    pub user_info_mapping: Option<UserInfoMapping>,
}

impl OAuth2ProviderConfig {
    /// Google's OpenID Connect endpoints with profile and email scopes.
    pub fn google(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            provider_id: GOOGLE_PROVIDER_ID.to_string(),
            client_id,
            client_secret,
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_endpoint: Some(
                "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            ),
            redirect_uri,
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            auth_params: HashMap::new(),
            use_pkce: true,
            user_info_mapping: None,
        }
    }

    /// GitHub OAuth app endpoints. GitHub does not support PKCE for OAuth apps.
    pub fn github(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            provider_id: GITHUB_PROVIDER_ID.to_string(),
            client_id,
            client_secret,
            authorization_endpoint: "https://github.com/login/oauth/authorize".to_string(),
            token_endpoint: "https://github.com/login/oauth/access_token".to_string(),
            userinfo_endpoint: Some("https://api.github.com/user".to_string()),
            redirect_uri,
            scopes: vec!["read:user".to_string(), "user:email".to_string()],
            auth_params: HashMap::new(),
            use_pkce: false,
            user_info_mapping: None,
        }
    }
}

/// Mapping configuration for user info fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoMapping {
    pub subject_field: Option<String>,
    pub email_field: Option<String>,
    pub name_field: Option<String>,
}

impl Default for UserInfoMapping {
    fn default() -> Self {
        Self {
            subject_field: Some("sub".to_string()),
            email_field: Some("email".to_string()),
            name_field: Some("name".to_string()),
        }
    }
}

/// Settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub state_ttl_seconds: u64,
    pub http_timeout_seconds: u64,
}

impl Default for OAuth2Config {
    fn default() -> Self {
        Self {
            state_ttl_seconds: 600, // 10 minutes
            http_timeout_seconds: 30,
        }
    }
}

impl OAuth2Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_ttl(mut self, seconds: u64) -> Self {
        self.state_ttl_seconds = seconds;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }
}
