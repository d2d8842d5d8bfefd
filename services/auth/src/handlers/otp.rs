use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{
    RequestCodeInput, RequestCodeUseCase, VerifyCodeInput, VerifyCodeUseCase,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ── POST /auth/otp/request ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestCodeRequest {
    pub email: String,
}

pub async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = RequestCodeUseCase {
        otp_store: state.otp_store.clone(),
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(RequestCodeInput { email: body.email })
        .await?;
    Ok(Json(MessageResponse {
        message: "OTP sent successfully!",
    }))
}

// ── POST /auth/otp/verify ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    /// The legacy portal frontend posts the code as `otp`.
    #[serde(alias = "otp")]
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub message: &'static str,
    pub token: String,
    #[serde(serialize_with = "pubportal_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AuthServiceError> {
    let usecase = VerifyCodeUseCase {
        otp_store: state.otp_store.clone(),
        credentials: state.credential_store(),
        sessions: state.sessions.clone(),
    };
    let output = usecase
        .execute(VerifyCodeInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(VerifyCodeResponse {
        message: "OTP verified successfully!",
        token: output.session.token,
        expires_at: output.session.expires_at,
    }))
}
