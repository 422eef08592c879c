//! OAuth2 error types.

use gateway_identity_core::IdentityError;
use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("State expired")]
    StateExpired,

    #[error("Missing authorization code")]
    MissingAuthorizationCode,

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("User info request failed: {0}")]
    UserInfoFailed(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Identity error: {0}")]
    IdentityError(#[from] IdentityError),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Invalid user info response: {0}")]
    InvalidUserInfoResponse(String),

    #[error("Provider profile has no usable email")]
    MissingEmail,

    #[error("Provider reports the email as unverified")]
    UnverifiedEmail,

    #[error("Callback error: {0}")]
    CallbackError(String),
}

impl From<OAuth2Error> for IdentityError {
    /// Provider-side rejections become `ProviderRejected`; transport and
    /// configuration problems stay faults.
    fn from(error: OAuth2Error) -> Self {
        match error {
            OAuth2Error::IdentityError(inner) => inner,
            OAuth2Error::HttpError(_) | OAuth2Error::ConfigError(_) | OAuth2Error::UrlError(_) => {
                IdentityError::DownstreamFault(error.to_string())
            }
            other => IdentityError::ProviderRejected(other.to_string()),
        }
    }
}
