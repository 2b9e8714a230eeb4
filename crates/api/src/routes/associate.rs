//! `POST /auth/associate-app-to-user` — forward an association upsert.
//!
//! The association itself lives in the primary backend; this route forwards
//! the payload on behalf of clients that cannot reach the backend directly.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use pagevault_domain::IdentityAssociation;
use tracing::debug;

use super::{missing_session, primary_jwt, reject};
use crate::state::AppState;

/// Responds 201 when the backend records the association.
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(association): axum::Json<IdentityAssociation>,
) -> Response {
    let Some(jwt) = primary_jwt(&headers) else {
        return missing_session();
    };

    match state.associations.associate(&association, &jwt).await {
        Ok(()) => {
            debug!(subject = %association.subject, "association forwarded");
            StatusCode::CREATED.into_response()
        }
        Err(err) => reject(&err),
    }
}
