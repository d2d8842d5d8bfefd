use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use pubportal_auth_types::token::AuthenticatedIdentity;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::admin::CheckAdminUseCase;

// ── GET /auth/session ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_email: String,
    pub is_admin: bool,
    #[serde(serialize_with = "pubportal_core::serde::to_epoch_secs")]
    pub exp: DateTime<Utc>,
}

pub async fn get_session(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let usecase = CheckAdminUseCase {
        credentials: state.credential_store(),
    };
    let is_admin = usecase.execute(&identity.user_email).await?;
    Ok(Json(SessionResponse {
        user_email: identity.user_email.into_inner(),
        is_admin,
        exp: identity.expires_at,
    }))
}

// ── POST /form/isAdmin ───────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

pub async fn is_admin(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
) -> Result<Json<IsAdminResponse>, AuthServiceError> {
    let usecase = CheckAdminUseCase {
        credentials: state.credential_store(),
    };
    let is_admin = usecase.execute(&identity.user_email).await?;
    Ok(Json(IsAdminResponse { is_admin }))
}
