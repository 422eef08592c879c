//! Credential verification backed by the downstream identity API.

use async_trait::async_trait;
use gateway_identity_core::{
    Credential, CredentialVerifier, IdentityDirectory, IdentityError, IdentityResult,
    VerifiedIdentity,
};
use std::sync::Arc;
use tracing::debug;

pub const LOCAL_PROVIDER_ID: &str = "local";

#[derive(Clone)]
pub struct DirectoryCredentialVerifier {
    directory: Arc<dyn IdentityDirectory>,
}

impl DirectoryCredentialVerifier {
    pub fn new(directory: Arc<dyn IdentityDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl CredentialVerifier for DirectoryCredentialVerifier {
    async fn verify(&self, credential: &Credential) -> IdentityResult<VerifiedIdentity> {
        if !credential.is_complete() {
            debug!("Rejecting incomplete credential without contacting downstream");
            return Err(IdentityError::InvalidCredentials);
        }

        let identity = self.directory.sign_in(credential).await?;

        Ok(identity.with_provider(LOCAL_PROVIDER_ID))
    }
}
