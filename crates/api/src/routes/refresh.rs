//! `POST /auth/oauth2/refresh-token` — stateless refresh proxy.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::reject;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Responds 200 with the fresh pair, 400 when the field is missing, 401 when
/// the provider rejects the token.
pub async fn handle(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Response {
    let Some(refresh_token) = request.refresh_token.filter(|t| !t.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "refresh_token is required" })),
        )
            .into_response();
    };

    match state.bridge.refresh(&refresh_token).await {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => reject(&err),
    }
}
