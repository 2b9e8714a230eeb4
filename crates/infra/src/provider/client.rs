//! HTTP implementation of the provider gateway.
//!
//! Talks to two provider endpoints: `POST {base}/oauth/token` for both grant
//! types and `GET {base}/.well-known/jwks.json` for the signing key set. The
//! token endpoint takes a JSON body, as the provider's native clients send.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use pagevault_core::auth::ports::ProviderGateway;
use pagevault_domain::{BridgeConfig, BridgeError, Result, TokenPair};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Provider gateway backed by the bridge's outbound [`HttpClient`].
#[derive(Clone)]
pub struct OAuthProviderClient {
    http: HttpClient,
    config: BridgeConfig,
}

/// Raw token-endpoint reply; fields are optional so absence can be reported
/// precisely instead of as a parse failure.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_pair(self) -> Result<TokenPair> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BridgeError::MalformedTokenResponse("no access_token".to_string()))?;
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BridgeError::MalformedTokenResponse("no refresh_token".to_string()))?;
        if self.token_type.as_deref().map_or(true, str::is_empty) {
            return Err(BridgeError::MalformedTokenResponse("no token_type".to_string()));
        }
        Ok(TokenPair { access_token, refresh_token })
    }
}

impl OAuthProviderClient {
    #[must_use]
    pub fn new(http: HttpClient, config: BridgeConfig) -> Self {
        Self { http, config }
    }

    async fn post_token(&self, body: serde_json::Value) -> Result<(StatusCode, String)> {
        let request = self.http.request(Method::POST, self.config.token_url()).json(&body);
        let response = self.http.send(request).await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            BridgeError::from(InfraError::Body(format!("reading token response: {e}")))
        })?;
        Ok((status, text))
    }
}

#[async_trait]
impl ProviderGateway for OAuthProviderClient {
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        client_id: &str,
    ) -> Result<TokenPair> {
        let (status, body) = self
            .post_token(json!({
                "grant_type": "authorization_code",
                "client_id": client_id,
                "code_verifier": verifier,
                "code": code,
                "redirect_uri": self.config.callback_url(),
            }))
            .await?;

        if !status.is_success() {
            warn!(%status, "authorization-code exchange refused");
            return Err(BridgeError::TokenExchangeFailed(format!("{status}: {body}")));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| BridgeError::MalformedTokenResponse(format!("unparseable body: {e}")))?;
        let pair = parsed.into_pair()?;
        debug!("authorization code exchanged for token pair");
        Ok(pair)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let (status, body) = self
            .post_token(json!({
                "grant_type": "refresh_token",
                "client_id": self.config.client_id,
                "refresh_token": refresh_token,
            }))
            .await?;

        if !status.is_success() {
            warn!(%status, "refresh token refused");
            return Err(BridgeError::RefreshRejected(format!("{status}: {body}")));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| BridgeError::MalformedTokenResponse(format!("unparseable body: {e}")))?;
        parsed.into_pair()
    }

    async fn fetch_key_set(&self) -> Result<JwkSet> {
        let request = self.http.request(Method::GET, self.config.jwks_url());
        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(BridgeError::Network(format!("key-set endpoint returned {status}")));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| BridgeError::Network(format!("unparseable key set: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use pagevault_domain::RedirectRule;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config_for(server: &MockServer) -> BridgeConfig {
        BridgeConfig {
            provider_base_url: server.uri(),
            client_id: "client123".to_string(),
            audience: "https://api.pagevault.dev".to_string(),
            callback_base_url: "https://pagevault.dev".to_string(),
            backend_base_url: "https://backend.pagevault.dev".to_string(),
            allowed_redirects: vec![RedirectRule::parse("app://cb").expect("rule")],
            outbound_timeout_secs: 15,
        }
    }

    fn client_for(server: &MockServer) -> OAuthProviderClient {
        OAuthProviderClient::new(HttpClient::new().expect("http client"), config_for(server))
    }

    #[tokio::test]
    async fn test_exchange_sends_code_grant_and_parses_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_partial_json(serde_json::json!({
                "grant_type": "authorization_code",
                "client_id": "client123",
                "code_verifier": "v",
                "code": "abc",
                "redirect_uri": "https://pagevault.dev/auth/oauth2/callback",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "A",
                "refresh_token": "R",
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pair = client_for(&server).exchange_code("abc", "v", "client123").await.expect("pair");
        assert_eq!(pair.access_token, "A");
        assert_eq!(pair.refresh_token, "R");
    }

    #[tokio::test]
    async fn test_exchange_rejection_maps_to_exchange_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err =
            client_for(&server).exchange_code("abc", "v", "client123").await.unwrap_err();
        assert!(matches!(err, BridgeError::TokenExchangeFailed(_)));
    }

    #[tokio::test]
    async fn test_exchange_without_refresh_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "A",
                "token_type": "Bearer",
            })))
            .mount(&server)
            .await;

        let err =
            client_for(&server).exchange_code("abc", "v", "client123").await.unwrap_err();
        assert!(matches!(err, BridgeError::MalformedTokenResponse(msg) if msg.contains("refresh_token")));
    }

    #[tokio::test]
    async fn test_refresh_sends_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_partial_json(serde_json::json!({
                "grant_type": "refresh_token",
                "client_id": "client123",
                "refresh_token": "R",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "A2",
                "refresh_token": "R2",
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pair = client_for(&server).refresh_token("R").await.expect("pair");
        assert_eq!(pair.access_token, "A2");
        assert_eq!(pair.refresh_token, "R2");
    }

    #[tokio::test]
    async fn test_refresh_rejection_maps_to_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).refresh_token("spent").await.unwrap_err();
        assert!(matches!(err, BridgeError::RefreshRejected(_)));
    }

    #[tokio::test]
    async fn test_fetches_and_parses_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "keys": [{
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo",
                    "kid": "k1",
                    "alg": "EdDSA",
                    "use": "sig",
                }]
            })))
            .mount(&server)
            .await;

        let keys = client_for(&server).fetch_key_set().await.expect("key set");
        assert!(keys.find("k1").is_some());
    }

    #[tokio::test]
    async fn test_key_set_fetch_failure_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_key_set().await.unwrap_err();
        assert!(matches!(err, BridgeError::Network(_)));
    }
}
