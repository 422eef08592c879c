use gateway_identity_core::IdentityError;
use thiserror::Error;

pub type DownstreamResult<T> = Result<T, DownstreamError>;

#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Downstream rejected the request with status {status}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl DownstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DownstreamError::HttpError(e) if e.is_timeout())
    }

    /// Classify for the verifier path: a client-error rejection is bad
    /// credentials; server errors, throttling and transport failures are faults.
    pub(crate) fn into_credential_error(self) -> IdentityError {
        match self {
            DownstreamError::Rejected { status, .. } if !is_fault_status(status) => {
                IdentityError::InvalidCredentials
            }
            other => IdentityError::DownstreamFault(other.to_string()),
        }
    }

    /// Classify for the provider-registration path.
    /// Any rejection is unauthorized here, whatever the status.
    pub(crate) fn into_provider_error(self) -> IdentityError {
        match self {
            DownstreamError::Rejected { status, .. } => IdentityError::ProviderRejected(format!(
                "sign-provider returned status {}",
                status
            )),
            other => IdentityError::DownstreamFault(other.to_string()),
        }
    }
}

/// Statuses that say the downstream could not answer, not that it said no.
fn is_fault_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}
