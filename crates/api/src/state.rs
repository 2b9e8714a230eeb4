//! Shared handler state.

use std::sync::Arc;
use std::time::Duration;

use pagevault_core::auth::ports::AssociationWriter;
use pagevault_core::AuthorizationBridge;
use pagevault_domain::{BridgeConfig, Result};
use pagevault_infra::{
    HttpAssociationWriter, HttpClient, HttpSessionResolver, OAuthProviderClient,
};

/// Everything the route handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<AuthorizationBridge>,
    pub associations: Arc<dyn AssociationWriter>,
}

impl AppState {
    #[must_use]
    pub fn new(bridge: Arc<AuthorizationBridge>, associations: Arc<dyn AssociationWriter>) -> Self {
        Self { bridge, associations }
    }

    /// Wire the bridge to its HTTP-backed collaborators from configuration.
    ///
    /// # Errors
    /// `BridgeError::Network` when the outbound HTTP client cannot be built.
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.outbound_timeout_secs))
            .build()?;

        let session =
            Arc::new(HttpSessionResolver::new(http.clone(), config.backend_base_url.clone()));
        let associations =
            Arc::new(HttpAssociationWriter::new(http.clone(), config.backend_base_url.clone()));
        let provider = Arc::new(OAuthProviderClient::new(http, config.clone()));

        let bridge =
            Arc::new(AuthorizationBridge::new(config, session, provider, associations.clone()));
        Ok(Self::new(bridge, associations))
    }
}
