use gateway_identity_core::IdentityError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Strategy already registered: {0}")]
    Duplicate(String),
}

/// Outcome of a failed authentication, as seen by the route layer.
///
/// `Unauthorized` carries the reason for logging only; it must never reach the
/// client.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Downstream fault: {0}")]
    DownstreamFault(String),

    #[error("Configuration fault: {0}")]
    Configuration(String),
}

impl From<IdentityError> for AuthFailure {
    fn from(error: IdentityError) -> Self {
        if error.is_unauthorized() {
            AuthFailure::Unauthorized(error.to_string())
        } else {
            AuthFailure::DownstreamFault(error.to_string())
        }
    }
}

impl From<RegistryError> for AuthFailure {
    fn from(error: RegistryError) -> Self {
        AuthFailure::Configuration(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_error_classification() {
        assert!(matches!(
            AuthFailure::from(IdentityError::InvalidCredentials),
            AuthFailure::Unauthorized(_)
        ));
        assert!(matches!(
            AuthFailure::from(IdentityError::ProviderRejected("denied".into())),
            AuthFailure::Unauthorized(_)
        ));
        assert!(matches!(
            AuthFailure::from(IdentityError::DownstreamFault("timed out".into())),
            AuthFailure::DownstreamFault(_)
        ));
        assert!(matches!(
            AuthFailure::from(RegistryError::NotFound("ldap".into())),
            AuthFailure::Configuration(_)
        ));
    }
}
