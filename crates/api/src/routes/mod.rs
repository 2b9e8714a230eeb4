//! Route handlers for the authorization bridge.
//!
//! Every handler follows the same discipline: the full error is logged with
//! `tracing`, and the caller only ever sees a generic 400/401 so provider
//! internals never leak through the HTTP surface.

pub mod associate;
pub mod authorize;
pub mod callback;
pub mod refresh;

use axum::http::header::{AUTHORIZATION, COOKIE, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use pagevault_domain::BridgeError;
use tracing::warn;

use crate::state::AppState;

/// Build the bridge's HTTP surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/oauth2/authorize", get(authorize::handle))
        .route("/auth/oauth2/callback", get(callback::handle))
        .route("/auth/oauth2/refresh-token", post(refresh::handle))
        .route("/auth/associate-app-to-user", post(associate::handle))
        .with_state(state)
}

/// Extract the primary session JWT from the request.
///
/// Accepts an `Authorization: Bearer` header or a `jwt` cookie, in that
/// order, matching what the detached clients send.
pub(crate) fn primary_jwt(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = token {
            return Some(token.to_string());
        }
    }

    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("jwt="))
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Map a bridge failure onto the generic HTTP reply.
pub(crate) fn reject(err: &BridgeError) -> Response {
    warn!(error = %err, "request rejected");
    let status = if err.is_client_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(serde_json::json!({ "error": "authorization failed" }))).into_response()
}

pub(crate) fn missing_session() -> Response {
    reject(&BridgeError::Unauthenticated("no session token on request".to_string()))
}

/// Redirect with an explicit status code (`axum::response::Redirect` only
/// offers 303/307/308).
pub(crate) fn redirect_to(status: StatusCode, location: &str) -> Response {
    (status, [(LOCATION, location.to_string())]).into_response()
}
