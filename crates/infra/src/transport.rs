//! HTTP implementations of the client-side guard ports.
//!
//! Every detached client wraps these in [`pagevault_core::Guarded`] so the
//! refresh-once-retry-once protocol is identical everywhere: send the bearer
//! request, treat HTTP 401 as the auth error class, refresh through the
//! bridge's refresh endpoint, persist the pair, retry.

use std::path::PathBuf;

use async_trait::async_trait;
use pagevault_core::auth::guard::{BearerTransport, RefreshClient, TokenStore, TransportError};
use pagevault_domain::{BridgeError, Result, TokenPair};
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::http::HttpClient;

/// A protected backend call: method, absolute URL, optional JSON body.
#[derive(Debug, Clone)]
pub struct BearerRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl BearerRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::GET, url: url.into(), body: None }
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::POST, url: url.into(), body: Some(body) }
    }
}

/// Bearer transport over the bridge's outbound [`HttpClient`].
#[derive(Clone)]
pub struct HttpBearerTransport {
    http: HttpClient,
}

impl HttpBearerTransport {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl BearerTransport for HttpBearerTransport {
    type Request = BearerRequest;
    type Response = reqwest::Response;

    async fn send(
        &self,
        request: &BearerRequest,
        access_token: &str,
    ) -> std::result::Result<reqwest::Response, TransportError> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .bearer_auth(access_token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await.map_err(TransportError::Other)?;
        let status = response.status();

        // Only 401 signals a spent access token; everything else non-2xx is
        // an ordinary failure that a refresh cannot help with.
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TransportError::Other(BridgeError::Network(format!(
                "protected endpoint returned {status}"
            ))));
        }

        Ok(response)
    }
}

/// Refresh client that posts to the bridge's refresh endpoint.
#[derive(Clone)]
pub struct HttpRefreshClient {
    http: HttpClient,
    refresh_url: String,
}

impl HttpRefreshClient {
    #[must_use]
    pub fn new(http: HttpClient, refresh_url: String) -> Self {
        Self { http, refresh_url }
    }
}

#[async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let request = self
            .http
            .request(Method::POST, &self.refresh_url)
            .json(&json!({ "refresh_token": refresh_token }));
        let response = self.http.send(request).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(BridgeError::RefreshRejected(format!("refresh returned {status}")));
        }
        if !status.is_success() {
            return Err(BridgeError::Network(format!("refresh endpoint returned {status}")));
        }

        let pair = response
            .json::<TokenPair>()
            .await
            .map_err(|e| BridgeError::MalformedTokenResponse(format!("refresh reply: {e}")))?;
        debug!("token pair refreshed through the bridge");
        Ok(pair)
    }
}

/// Token store persisting the pair as JSON on disk.
#[derive(Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<TokenPair> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BridgeError::Unauthenticated(format!("no stored token pair: {e}"))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| BridgeError::Internal(format!("corrupt token store: {e}")))
    }

    async fn save(&self, pair: &TokenPair) -> Result<()> {
        let contents = serde_json::to_string(pair)
            .map_err(|e| BridgeError::Internal(format!("serializing token pair: {e}")))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| BridgeError::Internal(format!("writing token store: {e}")))
    }
}
