//! Core identity types and traits shared by every authentication strategy.
//!
//! A strategy is either a [`CredentialVerifier`] (identifier/secret checked against
//! the downstream identity API) or a [`FederatedAdapter`] (an OAuth2 provider
//! handshake). Both terminate in the same [`VerifiedIdentity`], which is the only
//! value the session layer turns into a cookie and a response body.

mod credential;
mod error;
mod federated;
mod identity;

pub use credential::Credential;
pub use error::{IdentityError, IdentityResult};
pub use federated::{AuthorizationRedirect, CallbackParams, PendingAuthorization, ProviderProfile};
pub use identity::{IdentityClaims, SessionToken, VerifiedIdentity};

use async_trait::async_trait;

/// Checks an identifier/secret pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify the credential, returning the identity issued by the downstream API.
    ///
    /// Implementations fail with [`IdentityError::InvalidCredentials`] for an
    /// incomplete credential without performing any outbound call.
    async fn verify(&self, credential: &Credential) -> IdentityResult<VerifiedIdentity>;
}

/// One external identity provider's redirect/callback handshake.
#[async_trait]
pub trait FederatedAdapter: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Build the provider authorization redirect together with the pending state
    /// the callback must present.
    fn begin(&self) -> IdentityResult<AuthorizationRedirect>;

    /// Complete the handshake from the provider callback and register the resulting
    /// profile with the downstream identity API.
    async fn complete(
        &self,
        pending: PendingAuthorization,
        params: CallbackParams,
    ) -> IdentityResult<VerifiedIdentity>;
}

/// The downstream identity API as seen by verifiers and adapters.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn sign_in(&self, credential: &Credential) -> IdentityResult<VerifiedIdentity>;

    /// Create or look up the local account for a federated profile. The email is
    /// treated as verified by the provider.
    async fn sign_provider(&self, profile: &ProviderProfile) -> IdentityResult<VerifiedIdentity>;
}
