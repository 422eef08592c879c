use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Provider verification failed: {0}")]
    ProviderRejected(String),

    #[error("Downstream fault: {0}")]
    DownstreamFault(String),
}

impl IdentityError {
    /// Whether this failure is an authentication rejection rather than a fault.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            IdentityError::InvalidCredentials | IdentityError::ProviderRejected(_)
        )
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;
