//! Authentication gateway.
//!
//! Users sign in with an identifier/secret pair or through Google or GitHub. The
//! downstream API issues the bearer token, which the gateway hands to the browser
//! in the `token` cookie; every other route relays to the downstream API with that
//! token as `Authorization: Bearer`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use routes::build_router;
pub use state::{AppState, LOCAL_STRATEGY};
