//! Sign-in and federated entry/callback routes.

use crate::error::GatewayError;
use crate::state::{AppState, LOCAL_STRATEGY};
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite, SignedCookieJar};
use gateway_identity_core::{CallbackParams, Credential, IdentityClaims, PendingAuthorization};
use gateway_identity_oauth2::{GITHUB_PROVIDER_ID, GOOGLE_PROVIDER_ID};
use gateway_identity_session::{AuthRequest, SessionLifetime};
use serde::Deserialize;
use tracing::debug;

/// Signed cookie carrying the pending authorization between redirect and callback.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_PATH: &str = "/auth";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .merge(federated_routes(GOOGLE_PROVIDER_ID))
        .merge(federated_routes(GITHUB_PROVIDER_ID))
}

fn federated_routes(provider: &'static str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/auth/{provider}"),
            get(move |State(state): State<AppState>, jar: SignedCookieJar| {
                begin_federated(state, jar, provider)
            }),
        )
        .route(
            &format!("/auth/{provider}/callback"),
            get(
                move |State(state): State<AppState>,
                      signed: SignedCookieJar,
                      jar: CookieJar,
                      Query(params): Query<CallbackParams>| {
                    complete_federated(state, signed, jar, params, provider)
                },
            ),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody {
    #[serde(default, alias = "email")]
    identifier: Option<String>,
    #[serde(default, alias = "password")]
    secret: Option<String>,
    #[serde(default)]
    remember_me: Option<bool>,
}

/// The credential comes from a `Basic` authorization header when one is sent,
/// otherwise from the JSON body.
fn read_sign_in(headers: &HeaderMap, body: &[u8]) -> Result<(Credential, bool), GatewayError> {
    let form: SignInBody = if body.iter().all(u8::is_ascii_whitespace) {
        SignInBody::default()
    } else {
        serde_json::from_slice(body)
            .map_err(|e| GatewayError::bad_request(format!("invalid sign-in body: {}", e)))?
    };

    let basic = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| {
            value
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic "))
        });

    let credential = match basic {
        Some(value) => {
            Credential::from_basic_authorization(value).unwrap_or_else(|| Credential::new("", ""))
        }
        None => Credential::new(
            form.identifier.unwrap_or_default(),
            form.secret.unwrap_or_default(),
        ),
    };

    Ok((credential, form.remember_me.unwrap_or_default()))
}

async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(CookieJar, Json<IdentityClaims>), GatewayError> {
    let (credential, remember_me) = read_sign_in(&headers, &body)?;

    let session = state
        .authenticator
        .authenticate(
            LOCAL_STRATEGY,
            AuthRequest::Credentials {
                credential,
                lifetime: SessionLifetime::from_remember_me(remember_me),
            },
        )
        .await?;

    Ok((jar.add(session.cookie), Json(session.claims)))
}

async fn begin_federated(
    state: AppState,
    jar: SignedCookieJar,
    provider: &'static str,
) -> Result<(SignedCookieJar, Redirect), GatewayError> {
    let redirect = state.authenticator.begin(provider)?;

    let max_age = time::Duration::seconds(redirect.pending.remaining_seconds());
    let pending = serde_json::to_string(&redirect.pending)
        .map_err(|e| GatewayError::internal(format!("failed to encode oauth state: {}", e)))?;

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, pending))
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .secure(!state.dev_mode)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build();

    Ok((jar.add(cookie), Redirect::to(&redirect.url)))
}

/// The state cookie is single-use: it is cleared whatever the outcome.
async fn complete_federated(
    state: AppState,
    signed: SignedCookieJar,
    jar: CookieJar,
    params: CallbackParams,
    provider: &'static str,
) -> (
    SignedCookieJar,
    Result<(CookieJar, Json<IdentityClaims>), GatewayError>,
) {
    let pending = signed
        .get(OAUTH_STATE_COOKIE)
        .and_then(|cookie| serde_json::from_str::<PendingAuthorization>(cookie.value()).ok());
    let signed = signed.remove(Cookie::build(OAUTH_STATE_COOKIE).path(OAUTH_STATE_PATH));

    let result = finish_callback(&state, jar, pending, params, provider).await;
    (signed, result)
}

async fn finish_callback(
    state: &AppState,
    jar: CookieJar,
    pending: Option<PendingAuthorization>,
    params: CallbackParams,
    provider: &'static str,
) -> Result<(CookieJar, Json<IdentityClaims>), GatewayError> {
    state
        .authenticator
        .registry()
        .resolve(provider)
        .map_err(|e| GatewayError::internal(e.to_string()))?;

    let Some(pending) = pending else {
        debug!(provider, "Callback without a valid oauth state cookie");
        return Err(GatewayError::unauthorized(
            "missing or tampered oauth state cookie",
        ));
    };

    let session = state
        .authenticator
        .authenticate(provider, AuthRequest::Callback { pending, params })
        .await?;

    Ok((jar.add(session.cookie), Json(session.claims)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_body_credential_with_aliases() {
        let headers = HeaderMap::new();

        let (credential, remember_me) = read_sign_in(
            &headers,
            br#"{"identifier":"a@b.com","secret":"pw","rememberMe":true}"#,
        )
        .unwrap();
        assert_eq!(credential.identifier, "a@b.com");
        assert_eq!(credential.secret, "pw");
        assert!(remember_me);

        let (credential, remember_me) =
            read_sign_in(&headers, br#"{"email":"a@b.com","password":"pw"}"#).unwrap();
        assert_eq!(credential.identifier, "a@b.com");
        assert_eq!(credential.secret, "pw");
        assert!(!remember_me);
    }

    #[test]
    fn test_basic_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        // a@b.com:from-header
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Basic YUBiLmNvbTpmcm9tLWhlYWRlcg=="),
        );

        let (credential, remember_me) =
            read_sign_in(&headers, br#"{"identifier":"x","secret":"y","rememberMe":true}"#)
                .unwrap();
        assert_eq!(credential.identifier, "a@b.com");
        assert_eq!(credential.secret, "from-header");
        assert!(remember_me);

        let (credential, _) = read_sign_in(&headers, b"").unwrap();
        assert!(credential.is_complete());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let headers = HeaderMap::new();

        let (credential, remember_me) = read_sign_in(
            &headers,
            br#"{"identifier":null,"secret":"x","rememberMe":null}"#,
        )
        .unwrap();
        assert!(credential.identifier.is_empty());
        assert!(!credential.is_complete());
        assert!(!remember_me);
    }

    #[test]
    fn test_malformed_input() {
        let mut headers = HeaderMap::new();
        assert!(read_sign_in(&headers, b"identifier=a").is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        let (credential, _) = read_sign_in(&headers, b"").unwrap();
        assert!(!credential.is_complete());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let (credential, _) =
            read_sign_in(&headers, br#"{"identifier":"a@b.com","secret":"pw"}"#).unwrap();
        assert_eq!(credential.identifier, "a@b.com");
    }
}
