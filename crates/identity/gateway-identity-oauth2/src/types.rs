//! OAuth2 protocol types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OAuth2 token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

/// OAuth2 user info response (OpenID Connect compatible)
///
/// Accepts both the OpenID Connect `sub` and the legacy Google v1 `id` field for the
/// user identifier. Unknown claims are kept in `additional_claims` so a
/// [`UserInfoMapping`](crate::UserInfoMapping) can pick non-standard fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    #[serde(alias = "id")]
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(flatten)]
    pub additional_claims: HashMap<String, serde_json::Value>,
}

/// GitHub answers token requests with HTTP 200 in both cases.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GitHubTokenResponse {
    Success {
        access_token: String,
        #[allow(dead_code)]
        token_type: String,
    },
    Error {
        error: String,
        error_description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubUser {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_response_deserialize_sub_field() {
        let json = r#"{
            "sub": "123456789",
            "email": "user@example.com",
            "email_verified": true,
            "name": "Test User"
        }"#;

        let user_info: UserInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(user_info.sub, "123456789");
        assert_eq!(user_info.email, Some("user@example.com".to_string()));
        assert_eq!(user_info.email_verified, Some(true));
        assert_eq!(user_info.name, Some("Test User".to_string()));
    }

    #[test]
    fn test_user_info_response_deserialize_id_field() {
        let json = r#"{
            "id": "123456789",
            "email": "user@example.com",
            "name": "Test User",
            "custom_field": "custom_value"
        }"#;

        let user_info: UserInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(user_info.sub, "123456789");
        assert_eq!(
            user_info.additional_claims.get("custom_field").unwrap(),
            "custom_value"
        );
    }

    #[test]
    fn test_github_token_response_variants() {
        let ok: GitHubTokenResponse = serde_json::from_str(
            r#"{"access_token":"gho_abc","token_type":"bearer","scope":"read:user"}"#,
        )
        .unwrap();
        assert!(matches!(ok, GitHubTokenResponse::Success { ref access_token, .. } if access_token == "gho_abc"));

        let err: GitHubTokenResponse = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap();
        assert!(matches!(err, GitHubTokenResponse::Error { ref error, .. } if error == "bad_verification_code"));
    }
}
