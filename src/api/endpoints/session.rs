//! Session endpoints.
//!
//! - `GET /api/session` returns the signed-in user and their dashboard path
//! - `DELETE /api/session` signs out

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::Role;

#[derive(Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub patient_id: Option<String>,
    pub home_path: &'static str,
}

/// `GET /api/session`
pub async fn current(State(ctx): State<ApiContext>) -> Result<Json<SessionResponse>, ApiError> {
    let session = ctx.core.session()?.ok_or(ApiError::Unauthorized)?;
    Ok(Json(SessionResponse {
        home_path: session.role.home_path(),
        user_id: session.user_id,
        email: session.email,
        role: session.role,
        patient_id: session.patient_id,
    }))
}

/// `DELETE /api/session`
pub async fn end(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    ctx.core.sign_out()?;
    if let Some(client) = ctx.core.source().and_then(|s| s.backend()) {
        // The local session is gone either way.
        if let Err(e) = client.logout().await {
            tracing::warn!(error = %e, "Backend logout failed");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
