//! Collaborator ports for the authorization bridge.
//!
//! The bridge never talks to the network directly; the session resolver, the
//! OAuth provider, and the association backend sit behind these traits so the
//! flow can be driven with mocks in tests and with the HTTP implementations
//! from `pagevault-infra` in production.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use pagevault_domain::{IdentityAssociation, PrimaryUser, Result, TokenPair};

/// Resolves the primary user behind a request.
///
/// The primary login session itself is an external collaborator; the bridge
/// only needs "who is this JWT" or an `Unauthenticated` failure.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve the primary user for a session token.
    ///
    /// # Errors
    /// `Unauthenticated` when the token is missing, invalid, or expired.
    async fn resolve(&self, primary_jwt: &str) -> Result<PrimaryUser>;
}

/// The OAuth provider's token and key-set endpoints.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Exchange an authorization code plus PKCE verifier for a token pair.
    ///
    /// # Errors
    /// `TokenExchangeFailed` on non-success responses,
    /// `MalformedTokenResponse` when required fields are absent.
    async fn exchange_code(&self, code: &str, verifier: &str, client_id: &str)
        -> Result<TokenPair>;

    /// Turn a refresh token into a fresh token pair.
    ///
    /// # Errors
    /// `RefreshRejected` on non-success responses (terminal for the caller),
    /// `MalformedTokenResponse` when required fields are absent.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair>;

    /// Fetch the provider's current signing key set.
    ///
    /// # Errors
    /// `Network` when the key set cannot be fetched or parsed.
    async fn fetch_key_set(&self) -> Result<JwkSet>;
}

/// Writes the durable subject-to-user association.
#[async_trait]
pub trait AssociationWriter: Send + Sync {
    /// Create or update the association, authenticated as the primary user.
    ///
    /// # Errors
    /// `AssociationFailed` when the backend rejects or errors the upsert.
    async fn associate(&self, association: &IdentityAssociation, primary_jwt: &str) -> Result<()>;
}
