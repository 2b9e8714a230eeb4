//! Client-side token guard: the single-refresh, single-retry protocol.
//!
//! Detached clients hold a token pair and call resource endpoints with the
//! access token. When a call is rejected as unauthorized, the guard refreshes
//! the pair exactly once, persists it, and retries the original call exactly
//! once. A second rejection, or a refused refresh, is terminal: the client
//! must run the full authorization flow again. The guard never loops.

use std::sync::Arc;

use async_trait::async_trait;
use pagevault_domain::{BridgeError, Result, TokenPair};
use thiserror::Error;
use tracing::{debug, warn};

/// Terminal outcome of a guarded call.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The pair is spent: the access token was rejected twice, or the
    /// provider refused the refresh token. Only a new authorization helps.
    #[error("authorization expired, a full re-authorization is required")]
    ReauthorizeRequired,

    /// A non-authorization failure, surfaced unchanged and without any
    /// refresh attempt.
    #[error(transparent)]
    Failed(#[from] BridgeError),
}

/// Outcome of a single transport attempt.
#[derive(Debug)]
pub enum TransportError {
    /// The resource rejected the bearer token. Triggers the refresh path.
    Unauthorized,

    /// Anything else: network failure, server error, malformed reply.
    Other(BridgeError),
}

/// A resource call that authenticates with a bearer access token.
#[async_trait]
pub trait BearerTransport: Send + Sync {
    type Request: Send + Sync;
    type Response: Send;

    /// Perform one attempt of the call with the given access token.
    ///
    /// # Errors
    /// `TransportError::Unauthorized` only for authentication rejections;
    /// everything else is `TransportError::Other`.
    async fn send(
        &self,
        request: &Self::Request,
        access_token: &str,
    ) -> std::result::Result<Self::Response, TransportError>;
}

/// Turns a refresh token into a fresh pair, typically via the bridge's
/// refresh endpoint.
#[async_trait]
pub trait RefreshClient: Send + Sync {
    /// # Errors
    /// `RefreshRejected` when the provider refuses the token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}

/// Durable storage for the client's current token pair.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// # Errors
    /// `Unauthenticated` when no pair is stored.
    async fn load(&self) -> Result<TokenPair>;

    /// Replace the stored pair. A refresh supersedes the old pair entirely.
    ///
    /// # Errors
    /// `Internal` when persistence fails.
    async fn save(&self, pair: &TokenPair) -> Result<()>;
}

/// Wraps a [`BearerTransport`] with the refresh-once-retry-once protocol.
pub struct Guarded<T> {
    transport: T,
    refresh: Arc<dyn RefreshClient>,
    store: Arc<dyn TokenStore>,
}

impl<T: BearerTransport> Guarded<T> {
    pub fn new(transport: T, refresh: Arc<dyn RefreshClient>, store: Arc<dyn TokenStore>) -> Self {
        Self { transport, refresh, store }
    }

    /// Perform the call, refreshing and retrying at most once.
    ///
    /// On a successful refresh the new pair is persisted before the retry, so
    /// a crash between the two leaves the store holding a usable pair.
    ///
    /// # Errors
    /// `ReauthorizeRequired` when the pair is spent; `Failed` for anything
    /// that a refresh cannot help with.
    pub async fn send(&self, request: &T::Request) -> std::result::Result<T::Response, GuardError> {
        let pair = self.store.load().await?;

        match self.transport.send(request, &pair.access_token).await {
            Ok(response) => Ok(response),
            Err(TransportError::Other(e)) => Err(GuardError::Failed(e)),
            Err(TransportError::Unauthorized) => {
                debug!("access token rejected, refreshing pair");
                let fresh = match self.refresh.refresh(&pair.refresh_token).await {
                    Ok(fresh) => fresh,
                    Err(BridgeError::RefreshRejected(_) | BridgeError::Unauthenticated(_)) => {
                        warn!("refresh token refused, pair is spent");
                        return Err(GuardError::ReauthorizeRequired);
                    }
                    Err(e) => return Err(GuardError::Failed(e)),
                };
                self.store.save(&fresh).await?;

                match self.transport.send(request, &fresh.access_token).await {
                    Ok(response) => Ok(response),
                    Err(TransportError::Unauthorized) => {
                        warn!("fresh access token rejected, giving up");
                        Err(GuardError::ReauthorizeRequired)
                    }
                    Err(TransportError::Other(e)) => Err(GuardError::Failed(e)),
                }
            }
        }
    }
}
