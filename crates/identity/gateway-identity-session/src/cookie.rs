//! The `token` session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use gateway_identity_core::SessionToken;
use time::Duration;

pub const SESSION_COOKIE_NAME: &str = "token";

/// How long the issued cookie should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionLifetime {
    /// The caller asked to be remembered.
    Remembered,
    #[default]
    Standard,
}

impl SessionLifetime {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            SessionLifetime::Remembered
        } else {
            SessionLifetime::Standard
        }
    }
}

/// Builds the session cookie. In development mode `HttpOnly` and `Secure` are
/// dropped so the gateway can be exercised over plain HTTP.
#[derive(Debug, Clone)]
pub struct SessionCookieIssuer {
    dev_mode: bool,
    remember_me_ttl: Duration,
    standard_ttl: Duration,
}

impl SessionCookieIssuer {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            dev_mode,
            remember_me_ttl: Duration::days(30),
            standard_ttl: Duration::hours(2),
        }
    }

    pub fn with_remember_me_ttl(mut self, ttl: Duration) -> Self {
        self.remember_me_ttl = ttl;
        self
    }

    pub fn with_standard_ttl(mut self, ttl: Duration) -> Self {
        self.standard_ttl = ttl;
        self
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn max_age(&self, lifetime: SessionLifetime) -> Duration {
        match lifetime {
            SessionLifetime::Remembered => self.remember_me_ttl,
            SessionLifetime::Standard => self.standard_ttl,
        }
    }

    pub fn issue(&self, token: SessionToken, lifetime: SessionLifetime) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token.into_inner()))
            .path("/")
            .http_only(!self.dev_mode)
            .secure(!self.dev_mode)
            .same_site(SameSite::Lax)
            .max_age(self.max_age(lifetime))
            .build()
    }
}
