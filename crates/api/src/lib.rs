//! HTTP surface for the PageVault authorization bridge.
//!
//! Four routes: authorize (302 to the provider), callback (301 back to the
//! detached client with the token pair), refresh-token, and the association
//! forwarder. All state lives in [`state::AppState`].

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
