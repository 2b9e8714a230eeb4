//! Domain types for the PageVault authorization bridge.
//!
//! This crate holds the shared vocabulary of the bridge: the error taxonomy,
//! the token and authorization records exchanged between components, and the
//! configuration surface. It depends on nothing but serialization and time
//! crates so every other crate can use it freely.

pub mod constants;
pub mod errors;
pub mod types;

pub use errors::{BridgeError, Result};
pub use types::{
    BridgeConfig, DecodedAccessToken, IdentityAssociation, PendingAuthorization, PrimaryUser,
    RedirectRule, TokenPair,
};
