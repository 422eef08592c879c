//! Types exchanged across the federated redirect/callback handshake.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Normalized profile produced by a provider handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub subject: String,
    pub email: String,
    pub display_name: String,
}

/// State carried between the redirect and the callback of one handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub provider_id: String,
    pub code_verifier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingAuthorization {
    /// `None` when the expiry is not representable.
    pub fn new(
        state: String,
        provider_id: String,
        code_verifier: Option<String>,
        ttl_seconds: u64,
    ) -> Option<Self> {
        let created_at = Utc::now();
        let ttl = Duration::try_seconds(i64::try_from(ttl_seconds).ok()?)?;
        let expires_at = created_at.checked_add_signed(ttl)?;

        Some(Self {
            state,
            provider_id,
            code_verifier,
            created_at,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Remaining lifetime in whole seconds, zero once expired.
    pub fn remaining_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// Where to send the user agent, and what to remember until it comes back.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    pub url: String,
    pub pending: PendingAuthorization,
}

/// Query parameters of a provider callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
