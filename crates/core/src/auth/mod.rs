//! Authorization bridge components.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ AuthorizationBridge  │  authorize / callback / refresh orchestration
//! └─────────┬────────────┘
//!           │
//!           ├──► PkceChallenge          (verifier/challenge/state triples)
//!           ├──► PendingAuthorizations  (per-user in-flight records, 30s TTL)
//!           ├──► verifier               (JWKS signature + claim checks)
//!           └──► ports                  (session, provider, association)
//!
//! ┌──────────┐
//! │ Guarded  │  client-side single-refresh/single-retry protocol
//! └──────────┘
//! ```
//!
//! The bridge is written as a linear sequence of `Result`-returning steps so
//! each transition of the callback state machine is testable in isolation.

pub mod flow;
pub mod guard;
pub mod pending;
pub mod pkce;
pub mod ports;
#[cfg(test)]
pub(crate) mod testutil;
pub mod verifier;

pub use flow::AuthorizationBridge;
pub use guard::{BearerTransport, GuardError, Guarded, RefreshClient, TokenStore, TransportError};
pub use pending::PendingAuthorizations;
pub use pkce::PkceChallenge;
pub use ports::{AssociationWriter, ProviderGateway, SessionResolver};
