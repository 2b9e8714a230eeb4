//! `GET /auth/oauth2/callback` — complete an authorization attempt.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use super::{missing_session, primary_jwt, redirect_to, reject};
use crate::state::AppState;

/// Both parameters are optional at the HTTP layer so their absence maps to
/// the bridge's own error instead of a framework rejection.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Responds 301 to the detached client's redirect target carrying the token
/// pair, or a generic 400/401 on any failure.
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(jwt) = primary_jwt(&headers) else {
        return missing_session();
    };

    match state
        .bridge
        .complete_authorization(&jwt, params.code.as_deref(), params.state.as_deref())
        .await
    {
        Ok(target) => {
            debug!("authorization completed, redirecting to client");
            redirect_to(StatusCode::MOVED_PERMANENTLY, &target)
        }
        Err(err) => reject(&err),
    }
}
