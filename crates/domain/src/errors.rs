//! Error types used throughout the authorization bridge

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the authorization bridge.
///
/// Every failure in the authorize/callback/refresh path is terminal for the
/// current request: none of these variants are retried server-side. Handlers
/// log the full error and surface only a generic status to callers so
/// provider internals are never leaked.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BridgeError {
    /// No valid primary session accompanied the request.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// No live pending authorization exists for this user (missing, already
    /// consumed, or expired).
    #[error("No pending authorization: {0}")]
    NoPendingAuthorization(String),

    /// The stored redirect URI is not on the configured allow-list.
    #[error("Invalid redirect URI: {0}")]
    InvalidRedirect(String),

    /// The provider callback is missing `code` or `state`.
    #[error("Missing callback parameters: {0}")]
    MissingCallbackParams(String),

    /// The callback `state` does not match the stored state. CSRF signal.
    #[error("State mismatch")]
    StateMismatch,

    /// The provider token endpoint returned a non-success response for the
    /// authorization-code exchange.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The provider token response is missing required fields.
    #[error("Malformed token response: {0}")]
    MalformedTokenResponse(String),

    /// No key in the fetched key set matches the token's `kid` header.
    #[error("No key matching kid {0:?}")]
    UnknownKey(String),

    /// Signature verification failed, or the token is otherwise invalid.
    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    /// The token's `aud` claim differs from the configured audience.
    #[error("Audience mismatch")]
    AudienceMismatch,

    /// The token carries no usable `sub` claim.
    #[error("Token is missing the 'sub' claim")]
    MissingSubject,

    /// The association collaborator rejected or failed the upsert.
    #[error("Association failed: {0}")]
    AssociationFailed(String),

    /// The provider rejected the refresh token. Terminal for the caller: the
    /// full authorization flow must be re-run.
    #[error("Refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Whether the caller supplied malformed input (maps to HTTP 400 rather
    /// than the generic 401).
    #[must_use]
    pub fn is_client_input_error(&self) -> bool {
        matches!(self, Self::InvalidRedirect(_) | Self::MissingCallbackParams(_))
    }
}
