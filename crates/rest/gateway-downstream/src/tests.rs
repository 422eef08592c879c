//! Tests against a mocked downstream API.

#[cfg(test)]
mod integration_tests {
    use crate::{DownstreamClient, DownstreamConfig, ForwardRequest};
    use gateway_identity_core::{Credential, IdentityDirectory, IdentityError, ProviderProfile};
    use reqwest::Method;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, body_json, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DownstreamClient {
        DownstreamClient::new(DownstreamConfig {
            api_url: server.uri(),
            api_key_token: "app-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn auth_body(token: &str, id: &str) -> serde_json::Value {
        json!({
            "token": token,
            "user": { "id": id, "name": "Ada Lovelace", "email": "a@b.com" }
        })
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-in"))
            .and(basic_auth("a@b.com", "right"))
            .and(body_json(json!({ "apiKeyToken": "app-key" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1", "u-1")))
            .expect(1)
            .mount(&server)
            .await;

        let identity = client_for(&server)
            .sign_in(&Credential::new("a@b.com", "right"))
            .await
            .unwrap();

        assert_eq!(identity.token.as_str(), "tok-1");
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(identity.display_name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_sign_in_rejection_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-in"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .sign_in(&Credential::new("a@b.com", "wrong"))
            .await;

        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_server_error_is_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-in"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream db down"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .sign_in(&Credential::new("a@b.com", "right"))
            .await;

        assert!(matches!(result, Err(IdentityError::DownstreamFault(_))));
    }

    #[tokio::test]
    async fn test_sign_in_unexpected_shape_is_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-in"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .sign_in(&Credential::new("a@b.com", "right"))
            .await;

        assert!(matches!(result, Err(IdentityError::DownstreamFault(_))));
    }

    #[tokio::test]
    async fn test_sign_in_timeout_is_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-in"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(auth_body("tok-1", "u-1"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = DownstreamClient::new(DownstreamConfig {
            api_url: server.uri(),
            api_key_token: "app-key".to_string(),
            timeout: Duration::from_millis(50),
        })
        .unwrap();

        let result = client.sign_in(&Credential::new("a@b.com", "right")).await;
        assert!(matches!(result, Err(IdentityError::DownstreamFault(_))));
    }

    #[tokio::test]
    async fn test_unreachable_downstream_is_fault() {
        // Nothing listens on the discard port.
        let client = DownstreamClient::new(DownstreamConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key_token: "app-key".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let result = client.sign_in(&Credential::new("a@b.com", "right")).await;
        assert!(matches!(result, Err(IdentityError::DownstreamFault(_))));
    }

    #[tokio::test]
    async fn test_sign_provider_sends_verified_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-provider"))
            .and(body_json(json!({
                "name": "Ada Lovelace",
                "email": "a@b.com",
                "password": "google-sub-42",
                "apiKeyToken": "app-key",
                "emailVerified": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-2",
                "user": { "_id": 7, "name": "Ada Lovelace", "email": "a@b.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = ProviderProfile {
            provider_id: "google".to_string(),
            subject: "google-sub-42".to_string(),
            email: "a@b.com".to_string(),
            display_name: "Ada Lovelace".to_string(),
        };

        let identity = client_for(&server).sign_provider(&profile).await.unwrap();
        assert_eq!(identity.user_id, "7");
        assert_eq!(identity.provider_id.as_deref(), Some("google"));
    }

    #[tokio::test]
    async fn test_sign_provider_rejection_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sign-provider"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let profile = ProviderProfile {
            provider_id: "github".to_string(),
            subject: "42".to_string(),
            email: "a@b.com".to_string(),
            display_name: "ada".to_string(),
        };

        let result = client_for(&server).sign_provider(&profile).await;
        assert!(matches!(result, Err(IdentityError::ProviderRejected(_))));
    }

    #[tokio::test]
    async fn test_forward_relays_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user-movies"))
            .and(query_param("userId", "u-1"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/movies"))
            .and(body_partial_json(json!({ "title": "Metropolis" })))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad movie"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let listed = client
            .forward(
                ForwardRequest::new(Method::GET, "/api/user-movies")
                    .with_query("userId", "u-1")
                    .with_bearer(Some("tok-1".to_string())),
            )
            .await
            .unwrap();
        assert!(listed.is_success());
        assert_eq!(listed.body, json!({ "data": [] }));

        let created = client
            .forward(
                ForwardRequest::new(Method::POST, "/api/movies")
                    .with_body(json!({ "title": "Metropolis" })),
            )
            .await
            .unwrap();
        assert_eq!(created.status, 422);
        assert_eq!(created.body, json!("bad movie"));
    }

    #[test]
    fn test_config_validation() {
        let bad_scheme = DownstreamClient::new(DownstreamConfig {
            api_url: "ftp://example.com".to_string(),
            api_key_token: "k".to_string(),
            timeout: Duration::from_secs(1),
        });
        assert!(bad_scheme.is_err());

        let no_key = DownstreamClient::new(DownstreamConfig {
            api_url: "http://example.com".to_string(),
            api_key_token: String::new(),
            timeout: Duration::from_secs(1),
        });
        assert!(no_key.is_err());
    }
}
