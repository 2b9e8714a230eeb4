//! Shared constants for the authorization bridge.

/// Lifetime of a pending authorization record, in seconds.
///
/// The window only needs to cover the round trip through the provider's
/// consent screen back to the callback endpoint.
pub const PENDING_AUTH_TTL_SECS: i64 = 30;

/// Default timeout applied to every outbound call to the provider or the
/// backend. Finite so a slow provider fails the step instead of hanging.
pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 15;

/// Minimum number of random bytes for PKCE verifiers and CSRF state values.
pub const PKCE_ENTROPY_BYTES: usize = 32;

/// Scope requested from the provider. `offline_access` is required to be
/// issued a refresh token.
pub const AUTHORIZE_SCOPE: &str = "offline_access";
