//! Client for the downstream identity and resource API.
//!
//! The identity endpoints (`sign-in`, `sign-provider`) are exposed through the
//! [`IdentityDirectory`](gateway_identity_core::IdentityDirectory) trait. Everything
//! else goes through [`DownstreamClient::forward`], an opaque authorized-request
//! channel that relays status and body verbatim.

mod client;
mod error;
mod types;

#[cfg(test)]
mod tests;

pub use client::{DownstreamClient, DownstreamConfig};
pub use error::{DownstreamError, DownstreamResult};
pub use types::{ForwardRequest, ForwardedResponse};
