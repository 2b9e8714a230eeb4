//! `GET /auth/oauth2/authorize` — start an authorization attempt.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use super::{missing_session, primary_jwt, redirect_to, reject};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub redirect_uri: String,
    pub app_host: String,
}

/// Responds 302 with the provider's authorization URL, or 401 when no valid
/// primary session accompanies the request.
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let Some(jwt) = primary_jwt(&headers) else {
        return missing_session();
    };

    match state.bridge.begin_authorization(&jwt, &params.redirect_uri, &params.app_host).await {
        Ok(url) => {
            debug!(app_host = %params.app_host, "redirecting to provider");
            redirect_to(StatusCode::FOUND, &url)
        }
        Err(err) => reject(&err),
    }
}
