use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;

/// An identifier/secret pair presented for a single sign-in request.
#[derive(Clone)]
pub struct Credential {
    pub identifier: String,
    pub secret: String,
}

impl Credential {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.identifier.is_empty() && !self.secret.is_empty()
    }

    /// Parse an `Authorization: Basic` header value.
    pub fn from_basic_authorization(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (identifier, secret) = decoded.split_once(':')?;

        Some(Self::new(identifier, secret))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}
