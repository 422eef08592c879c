//! Session establishment on top of the identity strategies.
//!
//! A [`StrategyRegistry`] is populated once at startup and then shared read-only.
//! The [`Authenticator`] resolves a strategy by name, drives it, and turns the
//! resulting identity into a [`Session`]: the non-secret claims for the response
//! body and the `token` cookie built by the [`SessionCookieIssuer`].

mod authenticator;
mod cookie;
mod error;
mod registry;

pub use authenticator::{AuthRequest, Authenticator, Session};
pub use cookie::{SESSION_COOKIE_NAME, SessionCookieIssuer, SessionLifetime};
pub use error::{AuthFailure, RegistryError};
pub use registry::{Strategy, StrategyDescriptor, StrategyKind, StrategyRegistry};
