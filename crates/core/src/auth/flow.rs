//! Authorize / callback / refresh orchestration.
//!
//! The callback handler is the core state machine:
//!
//! ```text
//! Start → UserResolved → PendingRetrieved → StateValidated
//!       → CodeExchanged → TokenVerified → Associated → Redirected
//! ```
//!
//! It is written as a linear sequence of `Result`-returning steps: any
//! failure short-circuits the request, is logged with full context, and is
//! surfaced to the caller as a generic status by the HTTP layer.

use std::sync::Arc;

use pagevault_domain::constants::AUTHORIZE_SCOPE;
use pagevault_domain::{
    BridgeConfig, BridgeError, IdentityAssociation, PendingAuthorization, Result, TokenPair,
};
use tracing::{debug, info, warn};
use url::Url;

use super::pending::PendingAuthorizations;
use super::pkce::PkceChallenge;
use super::ports::{AssociationWriter, ProviderGateway, SessionResolver};
use super::verifier::verify_access_token;

/// Orchestrates the PKCE authorization flow on behalf of detached clients.
///
/// Holds the pending-authorization store and the three collaborator ports.
/// One instance serves all users; each request is a single pass through the
/// flow with no background work.
pub struct AuthorizationBridge {
    config: BridgeConfig,
    pending: PendingAuthorizations,
    session: Arc<dyn SessionResolver>,
    provider: Arc<dyn ProviderGateway>,
    associations: Arc<dyn AssociationWriter>,
}

impl AuthorizationBridge {
    #[must_use]
    pub fn new(
        config: BridgeConfig,
        session: Arc<dyn SessionResolver>,
        provider: Arc<dyn ProviderGateway>,
        associations: Arc<dyn AssociationWriter>,
    ) -> Self {
        Self { config, pending: PendingAuthorizations::new(), session, provider, associations }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Pending-authorization store, exposed for inspection in tests.
    #[must_use]
    pub fn pending(&self) -> &PendingAuthorizations {
        &self.pending
    }

    /// Start an authorization attempt and return the provider URL to
    /// redirect the user agent to.
    ///
    /// Resolves the primary user, generates fresh PKCE values, persists the
    /// pending record under the username (overwriting any prior attempt),
    /// and builds the provider's `/authorize` URL.
    ///
    /// # Errors
    /// `Unauthenticated` when the session cannot be resolved. Persistence is
    /// in-memory and infallible; no partial state is left observable on the
    /// error path.
    pub async fn begin_authorization(
        &self,
        primary_jwt: &str,
        redirect_uri: &str,
        app_host: &str,
    ) -> Result<String> {
        let user = self.session.resolve(primary_jwt).await?;

        let pkce = PkceChallenge::generate();
        let challenge_method = pkce.challenge_method();
        let record = PendingAuthorization::new(
            pkce.state.clone(),
            pkce.verifier,
            redirect_uri.to_string(),
            self.config.client_id.clone(),
            app_host.to_string(),
        );
        self.pending.put(&user.username, record);

        info!(user = %user.username, app_host, "authorization attempt started");

        Ok(format!(
            "{}?response_type=code&client_id={}&code_challenge={}&code_challenge_method={}\
             &redirect_uri={}&scope={}&audience={}&state={}",
            self.config.authorization_url(),
            urlencoding::encode(&self.config.client_id),
            pkce.challenge,
            challenge_method,
            urlencoding::encode(&self.config.callback_url()),
            AUTHORIZE_SCOPE,
            urlencoding::encode(&self.config.audience),
            pkce.state,
        ))
    }

    /// Complete an authorization attempt from the provider callback and
    /// return the detached client's redirect URL carrying the token pair.
    ///
    /// Consumes the pending record (exactly once), validates the redirect
    /// target and CSRF state, exchanges the code, verifies the access token
    /// against the provider key set, and records the identity association.
    ///
    /// # Errors
    /// Any step failure is terminal; see the error taxonomy in
    /// [`pagevault_domain::BridgeError`].
    pub async fn complete_authorization(
        &self,
        primary_jwt: &str,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<String> {
        // Start → UserResolved
        let user = self.session.resolve(primary_jwt).await?;

        // → PendingRetrieved (consume-and-delete)
        let record = self.pending.take(&user.username)?;

        // → StateValidated
        let redirect_target = self.validate_redirect(&record)?;
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| BridgeError::MissingCallbackParams("code".to_string()))?;
        let state = state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BridgeError::MissingCallbackParams("state".to_string()))?;
        if state != record.state {
            warn!(user = %user.username, "callback state does not match stored state");
            return Err(BridgeError::StateMismatch);
        }

        // → CodeExchanged. The key-set fetch has no data dependency on the
        // exchange, so both calls run concurrently.
        let (pair, key_set) = {
            let exchange = self.provider.exchange_code(code, &record.verifier, &record.client_id);
            let keys = self.provider.fetch_key_set();
            let (pair, key_set) = tokio::join!(exchange, keys);
            (pair?, key_set?)
        };

        // → TokenVerified
        let decoded = verify_access_token(&pair.access_token, &key_set, &self.config.audience)?;
        debug!(user = %user.username, kid = %decoded.key_id, "access token verified");

        // → Associated
        let association = IdentityAssociation {
            subject: decoded.subject,
            client_id: record.client_id,
            app_host: record.app_host,
        };
        self.associations.associate(&association, primary_jwt).await?;

        info!(user = %user.username, subject = %association.subject, "authorization completed");

        // → Redirected. Tokens travel in the query string deliberately: the
        // allow-listed targets are app-scheme/extension URLs that never reach
        // the network, so exposure is limited to the local device.
        Ok(format!(
            "{}?access_token={}&refresh_token={}",
            redirect_target,
            urlencoding::encode(&pair.access_token),
            urlencoding::encode(&pair.refresh_token),
        ))
    }

    /// Stateless refresh passthrough: turn a refresh token into a fresh
    /// pair. Performs no lookups against pending records or associations.
    ///
    /// # Errors
    /// `RefreshRejected` when the provider refuses the token (the caller
    /// must re-run the full flow); `MalformedTokenResponse` when the
    /// provider reply is missing fields.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let pair = self.provider.refresh_token(refresh_token).await?;
        debug!("refresh token exchanged for a new pair");
        Ok(pair)
    }

    fn validate_redirect(&self, record: &PendingAuthorization) -> Result<Url> {
        let target = Url::parse(&record.redirect_uri).map_err(|e| {
            BridgeError::InvalidRedirect(format!(
                "unparseable redirect uri {:?}: {e}",
                record.redirect_uri
            ))
        })?;

        if !self.config.redirect_allowed(&target) {
            return Err(BridgeError::InvalidRedirect(format!(
                "redirect uri {:?} is not allow-listed",
                record.redirect_uri
            )));
        }

        Ok(target)
    }
}
