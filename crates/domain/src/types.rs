//! Core data types for the authorization bridge.
//!
//! These are the records that cross component boundaries: the short-lived
//! pending-authorization record, the opaque token pair returned by the
//! provider, the decoded access-token claims, and the durable identity
//! association handed to the backend.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::PENDING_AUTH_TTL_SECS;
use crate::errors::BridgeError;

/// Short-lived record correlating an in-flight authorization attempt with its
/// CSRF state and PKCE verifier.
///
/// One record exists per user; a new attempt overwrites the previous one.
/// Created by the initiator, consumed exactly once by the callback handler.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    /// Opaque CSRF token, generated per attempt, single-use.
    pub state: String,

    /// PKCE code verifier, kept secret until the token exchange.
    pub verifier: String,

    /// The detached client's final destination.
    pub redirect_uri: String,

    /// OAuth client id that initiated the flow.
    pub client_id: String,

    /// Opaque identifier for the client application instance.
    pub app_host: String,

    /// Creation timestamp; starts the expiry clock.
    pub created_at: DateTime<Utc>,

    /// Record lifetime. Expired records must not be consumable.
    pub ttl: Duration,
}

impl PendingAuthorization {
    /// Create a record stamped with the current time and the default TTL.
    #[must_use]
    pub fn new(
        state: String,
        verifier: String,
        redirect_uri: String,
        client_id: String,
        app_host: String,
    ) -> Self {
        Self {
            state,
            verifier,
            redirect_uri,
            client_id,
            app_host,
            created_at: Utc::now(),
            ttl: Duration::seconds(PENDING_AUTH_TTL_SECS),
        }
    }

    /// Whether the record has outlived its TTL at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > self.ttl
    }
}

/// Opaque bearer credentials issued by the provider.
///
/// Immutable once issued; a refresh supersedes the pair, it never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Claims recovered from a verified access token.
///
/// Derived, never stored; recomputed from the raw token whenever verification
/// is needed.
#[derive(Debug, Clone)]
pub struct DecodedAccessToken {
    /// External user identifier (`sub` claim).
    pub subject: String,

    /// Audience the token was issued for (`aud` claim).
    pub audience: String,

    /// Identifier of the signing key used (`kid` header).
    pub key_id: String,

    /// Token expiry (`exp` claim).
    pub expiry: DateTime<Utc>,
}

/// Durable link between a provider subject and the primary user's account.
///
/// Upsert only; never deleted by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityAssociation {
    #[serde(rename = "sub")]
    pub subject: String,
    pub client_id: String,
    pub app_host: String,
}

/// The primary system's view of the authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryUser {
    pub username: String,
}

/// An allow-listed redirect destination for detached clients.
///
/// Matching is exact on scheme and host. Extension and app-scheme redirect
/// targets are not network-reachable, which is what makes returning tokens in
/// their query strings acceptable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedirectRule {
    pub scheme: String,
    pub host: String,
}

impl RedirectRule {
    /// Parse a rule from its `scheme://host` form.
    ///
    /// # Errors
    /// Returns `BridgeError::Config` when the value is not a parseable URL or
    /// carries no host.
    pub fn parse(value: &str) -> Result<Self, BridgeError> {
        let url = Url::parse(value)
            .map_err(|e| BridgeError::Config(format!("invalid redirect rule {value:?}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| BridgeError::Config(format!("redirect rule {value:?} has no host")))?;
        Ok(Self { scheme: url.scheme().to_string(), host: host.to_string() })
    }

    /// Exact scheme + host comparison against a candidate redirect target.
    #[must_use]
    pub fn matches(&self, candidate: &Url) -> bool {
        candidate.scheme() == self.scheme && candidate.host_str() == Some(self.host.as_str())
    }
}

/// Configuration for the authorization bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// OAuth provider base URL (e.g. `https://dev-abc.us.auth0.com`).
    pub provider_base_url: String,

    /// OAuth client id registered with the provider.
    pub client_id: String,

    /// Expected `aud` claim on issued access tokens.
    pub audience: String,

    /// Public base URL of this bridge, used to build the callback redirect.
    pub callback_base_url: String,

    /// Base URL of the primary backend (userinfo + association endpoints).
    pub backend_base_url: String,

    /// Allow-listed redirect destinations for detached clients.
    pub allowed_redirects: Vec<RedirectRule>,

    /// Timeout in seconds for outbound provider/backend calls.
    pub outbound_timeout_secs: u64,
}

impl BridgeConfig {
    /// The provider's authorization endpoint.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        format!("{}/authorize", self.provider_base_url)
    }

    /// The provider's token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.provider_base_url)
    }

    /// The provider's published key-set endpoint.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.provider_base_url)
    }

    /// The callback URL this bridge registers with the provider.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("{}/auth/oauth2/callback", self.callback_base_url)
    }

    /// Whether the given redirect target matches any allow-listed rule.
    #[must_use]
    pub fn redirect_allowed(&self, candidate: &Url) -> bool {
        self.allowed_redirects.iter().any(|rule| rule.matches(candidate))
    }
}
