//! HTTP-backed collaborators for the PageVault authorization bridge.
//!
//! Implements the ports declared in `pagevault-core` against real endpoints:
//! the OAuth provider's token and JWKS endpoints, the primary backend's
//! userinfo and association endpoints, and the bearer transport + refresh
//! client the token guard wraps. Also home to the configuration loader.

pub mod config;
pub mod errors;
pub mod http;
pub mod identity;
pub mod provider;
pub mod transport;

pub use errors::InfraError;
pub use http::HttpClient;
pub use identity::{HttpAssociationWriter, HttpSessionResolver};
pub use provider::OAuthProviderClient;
pub use transport::{BearerRequest, FileTokenStore, HttpBearerTransport, HttpRefreshClient};
