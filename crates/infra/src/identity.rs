//! Primary-identity collaborators.
//!
//! The primary backend owns login sessions and the durable subject-to-user
//! associations. The bridge only calls two of its endpoints: `GET
//! /api/userinfo` to resolve the user behind a session JWT and `POST
//! /api/associate-app-to-user` to record an association.

use async_trait::async_trait;
use pagevault_core::auth::ports::{AssociationWriter, SessionResolver};
use pagevault_domain::{BridgeError, IdentityAssociation, PrimaryUser, Result};
use reqwest::Method;
use tracing::{debug, warn};

use crate::http::HttpClient;

/// Resolves the primary user by presenting the session JWT to the backend.
#[derive(Clone)]
pub struct HttpSessionResolver {
    http: HttpClient,
    backend_base_url: String,
}

impl HttpSessionResolver {
    #[must_use]
    pub fn new(http: HttpClient, backend_base_url: String) -> Self {
        Self { http, backend_base_url }
    }

    fn userinfo_url(&self) -> String {
        format!("{}/api/userinfo", self.backend_base_url)
    }
}

#[async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, primary_jwt: &str) -> Result<PrimaryUser> {
        let request =
            self.http.request(Method::GET, self.userinfo_url()).bearer_auth(primary_jwt);
        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            warn!(%status, "backend refused the session token");
            return Err(BridgeError::Unauthenticated(format!("userinfo returned {status}")));
        }

        let user = response
            .json::<PrimaryUser>()
            .await
            .map_err(|e| BridgeError::Unauthenticated(format!("unparseable userinfo: {e}")))?;
        debug!(user = %user.username, "session resolved");
        Ok(user)
    }
}

/// Records subject-to-user associations on the backend.
#[derive(Clone)]
pub struct HttpAssociationWriter {
    http: HttpClient,
    backend_base_url: String,
}

impl HttpAssociationWriter {
    #[must_use]
    pub fn new(http: HttpClient, backend_base_url: String) -> Self {
        Self { http, backend_base_url }
    }

    fn association_url(&self) -> String {
        format!("{}/api/associate-app-to-user", self.backend_base_url)
    }
}

#[async_trait]
impl AssociationWriter for HttpAssociationWriter {
    async fn associate(&self, association: &IdentityAssociation, primary_jwt: &str) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, self.association_url())
            .bearer_auth(primary_jwt)
            .json(association);
        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            warn!(%status, subject = %association.subject, "association upsert refused");
            return Err(BridgeError::AssociationFailed(format!(
                "association endpoint returned {status}"
            )));
        }

        debug!(subject = %association.subject, "association recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_resolves_user_with_bearer_jwt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/userinfo"))
            .and(header("authorization", "Bearer session-jwt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"username": "alice"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver =
            HttpSessionResolver::new(HttpClient::new().expect("http client"), server.uri());
        let user = resolver.resolve("session-jwt").await.expect("user");
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_refused_session_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let resolver =
            HttpSessionResolver::new(HttpClient::new().expect("http client"), server.uri());
        let err = resolver.resolve("bad-jwt").await.unwrap_err();
        assert!(matches!(err, BridgeError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_association_posts_subject_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/associate-app-to-user"))
            .and(header("authorization", "Bearer session-jwt"))
            .and(body_json(serde_json::json!({
                "sub": "auth0|user123",
                "client_id": "client123",
                "app_host": "deviceA",
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let writer =
            HttpAssociationWriter::new(HttpClient::new().expect("http client"), server.uri());
        let association = IdentityAssociation {
            subject: "auth0|user123".to_string(),
            client_id: "client123".to_string(),
            app_host: "deviceA".to_string(),
        };
        writer.associate(&association, "session-jwt").await.expect("association recorded");
    }

    #[tokio::test]
    async fn test_refused_association_maps_to_association_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/associate-app-to-user"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let writer =
            HttpAssociationWriter::new(HttpClient::new().expect("http client"), server.uri());
        let association = IdentityAssociation {
            subject: "auth0|user123".to_string(),
            client_id: "client123".to_string(),
            app_host: "deviceA".to_string(),
        };
        let err = writer.associate(&association, "session-jwt").await.unwrap_err();
        assert!(matches!(err, BridgeError::AssociationFailed(_)));
    }
}
