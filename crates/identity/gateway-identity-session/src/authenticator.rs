//! Drives a resolved strategy and turns its outcome into a session.

use crate::cookie::{SessionCookieIssuer, SessionLifetime};
use crate::error::AuthFailure;
use crate::registry::{Strategy, StrategyKind, StrategyRegistry};
use axum_extra::extract::cookie::Cookie;
use gateway_identity_core::{
    AuthorizationRedirect, CallbackParams, Credential, IdentityClaims, PendingAuthorization,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// What the route layer hands to a strategy.
#[derive(Debug)]
pub enum AuthRequest {
    Credentials {
        credential: Credential,
        lifetime: SessionLifetime,
    },
    Callback {
        pending: PendingAuthorization,
        params: CallbackParams,
    },
}

impl AuthRequest {
    fn kind(&self) -> StrategyKind {
        match self {
            AuthRequest::Credentials { .. } => StrategyKind::Local,
            AuthRequest::Callback { .. } => StrategyKind::Federated,
        }
    }
}

/// A successful authentication: the body claims and the `token` cookie.
pub struct Session {
    pub claims: IdentityClaims,
    pub cookie: Cookie<'static>,
}

#[derive(Clone)]
pub struct Authenticator {
    registry: Arc<StrategyRegistry>,
    issuer: SessionCookieIssuer,
}

impl Authenticator {
    pub fn new(registry: Arc<StrategyRegistry>, issuer: SessionCookieIssuer) -> Self {
        Self { registry, issuer }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Start a federated handshake.
    pub fn begin(&self, strategy: &str) -> Result<AuthorizationRedirect, AuthFailure> {
        let descriptor = self.registry.resolve(strategy).inspect_err(|e| {
            error!(strategy, "Strategy lookup failed: {}", e);
        })?;

        let Strategy::Federated(adapter) = &descriptor.strategy else {
            error!(strategy, "Redirect requested for a non-federated strategy");
            return Err(AuthFailure::Configuration(format!(
                "strategy {} is not federated",
                strategy
            )));
        };

        let redirect = adapter.begin().map_err(AuthFailure::from).inspect_err(|e| {
            error!(strategy, "Failed to build authorization redirect: {}", e);
        })?;

        info!(strategy, "Redirecting to identity provider");
        Ok(redirect)
    }

    /// Run the named strategy. Every failure returns before the cookie is built.
    pub async fn authenticate(
        &self,
        strategy: &str,
        request: AuthRequest,
    ) -> Result<Session, AuthFailure> {
        let descriptor = self.registry.resolve(strategy).inspect_err(|e| {
            error!(strategy, "Strategy lookup failed: {}", e);
        })?;

        let kind = descriptor.kind();
        let (outcome, lifetime) = match (&descriptor.strategy, request) {
            (
                Strategy::Local(verifier),
                AuthRequest::Credentials {
                    credential,
                    lifetime,
                },
            ) => (verifier.verify(&credential).await, lifetime),
            (Strategy::Federated(adapter), AuthRequest::Callback { pending, params }) => (
                adapter.complete(pending, params).await,
                SessionLifetime::Standard,
            ),
            (_, request) => {
                error!(
                    strategy,
                    "Strategy is {} but received a {} request",
                    kind,
                    request.kind()
                );
                return Err(AuthFailure::Configuration(format!(
                    "strategy {} cannot handle a {} request",
                    strategy,
                    request.kind()
                )));
            }
        };

        let identity = match outcome {
            Ok(identity) => identity,
            Err(e) => {
                let failure = AuthFailure::from(e);
                match &failure {
                    AuthFailure::Unauthorized(reason) => {
                        warn!(strategy, "Authentication rejected: {}", reason);
                    }
                    other => error!(strategy, "Authentication failed: {}", other),
                }
                return Err(failure);
            }
        };

        let (token, claims) = identity.into_parts();
        let cookie = self.issuer.issue(token, lifetime);

        info!(strategy, user_id = %claims.user_id, "Authentication succeeded");
        Ok(Session { claims, cookie })
    }
}
