//! Core authorization-bridge logic for PageVault.
//!
//! Everything protocol-shaped lives here: PKCE generation, the pending
//! authorization store, JWKS verification, the callback state machine, and
//! the client-side token guard. Network and persistence concerns are behind
//! the ports in [`auth::ports`]; `pagevault-infra` provides the HTTP-backed
//! implementations.

pub mod auth;

pub use auth::flow::AuthorizationBridge;
pub use auth::guard::{BearerTransport, GuardError, Guarded, RefreshClient, TokenStore, TransportError};
pub use auth::pending::PendingAuthorizations;
pub use auth::pkce::PkceChallenge;
pub use auth::verifier::verify_access_token;
