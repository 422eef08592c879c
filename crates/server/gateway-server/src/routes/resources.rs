//! Sign-up and the movie resources, relayed to the downstream API with the
//! caller's bearer token.

use crate::error::GatewayError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use gateway_downstream::{ForwardRequest, ForwardedResponse};
use gateway_identity_session::SESSION_COOKIE_NAME;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{movie_id}", get(get_movie).delete(delete_movie))
        .route("/user-movies", get(list_user_movies).post(create_user_movie))
        .route("/user-movies/{user_movie_id}", delete(delete_user_movie))
}

fn bearer(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Ids are interpolated into the downstream path, so only plain segments pass.
fn resource_id(id: &str) -> Result<&str, GatewayError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(GatewayError::bad_request(format!("invalid resource id '{}'", id)))
    }
}

fn relay(response: ForwardedResponse) -> Result<Response, GatewayError> {
    let status = StatusCode::from_u16(response.status)
        .map_err(|e| GatewayError::bad_gateway(format!("invalid downstream status: {}", e)))?;

    Ok(match response.body {
        Value::Null => status.into_response(),
        body => (status, Json(body)).into_response(),
    })
}

async fn forward(
    state: &AppState,
    jar: &CookieJar,
    request: ForwardRequest,
) -> Result<Response, GatewayError> {
    let response = state
        .downstream
        .forward(request.with_bearer(bearer(jar)))
        .await?;
    relay(response)
}

async fn sign_up(
    State(state): State<AppState>,
    Json(user): Json<Value>,
) -> Result<Response, GatewayError> {
    let response = state.downstream.sign_up(user).await?;
    if !response.is_success() {
        return relay(response);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created" })),
    )
        .into_response())
}

async fn list_movies(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, GatewayError> {
    forward(&state, &jar, ForwardRequest::new(Method::GET, "/api/movies")).await
}

async fn get_movie(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(movie_id): Path<String>,
) -> Result<Response, GatewayError> {
    let path = format!("/api/movies/{}", resource_id(&movie_id)?);
    forward(&state, &jar, ForwardRequest::new(Method::GET, path)).await
}

async fn create_movie(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(movie): Json<Value>,
) -> Result<Response, GatewayError> {
    let request = ForwardRequest::new(Method::POST, "/api/movies/create").with_body(movie);
    forward(&state, &jar, request).await
}

async fn delete_movie(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(movie_id): Path<String>,
) -> Result<Response, GatewayError> {
    let path = format!("/api/movies/{}", resource_id(&movie_id)?);
    forward(&state, &jar, ForwardRequest::new(Method::DELETE, path)).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserMoviesQuery {
    #[serde(alias = "id")]
    user_id: String,
}

async fn list_user_movies(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<UserMoviesQuery>,
) -> Result<Response, GatewayError> {
    let request =
        ForwardRequest::new(Method::GET, "/api/user-movies").with_query("id", query.user_id);
    forward(&state, &jar, request).await
}

async fn create_user_movie(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(user_movie): Json<Value>,
) -> Result<Response, GatewayError> {
    let request = ForwardRequest::new(Method::POST, "/api/user-movies").with_body(user_movie);
    forward(&state, &jar, request).await
}

async fn delete_user_movie(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(user_movie_id): Path<String>,
) -> Result<Response, GatewayError> {
    let path = format!("/api/user-movies/{}", resource_id(&user_movie_id)?);
    forward(&state, &jar, ForwardRequest::new(Method::DELETE, path)).await
}
