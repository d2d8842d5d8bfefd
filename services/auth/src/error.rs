use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// Session-token failures are not listed here: the access gate rejects those
/// before a handler runs, with `pubportal_auth_types::error::AuthError`.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("error sending mail")]
    Delivery,
    #[error("no otp found")]
    OtpNotFound,
    #[error("otp has expired, request a new one")]
    OtpExpired,
    #[error("invalid otp")]
    OtpMismatch,
    #[error("you are not an admin")]
    Forbidden,
    #[error("invalid email")]
    InvalidEmail,
    #[error("admin not found")]
    AdminNotFound,
    #[error("admin already exists")]
    AdminAlreadyExists,
    #[error("you cannot remove yourself as an admin")]
    CannotRemoveSelf,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delivery => "DELIVERY_FAILED",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpMismatch => "OTP_MISMATCH",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::AdminNotFound => "ADMIN_NOT_FOUND",
            Self::AdminAlreadyExists => "ADMIN_ALREADY_EXISTS",
            Self::CannotRemoveSelf => "CANNOT_REMOVE_SELF",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OtpNotFound | Self::OtpExpired => StatusCode::BAD_REQUEST,
            Self::InvalidEmail | Self::CannotRemoveSelf => StatusCode::BAD_REQUEST,
            Self::OtpMismatch => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AdminNotFound => StatusCode::NOT_FOUND,
            Self::AdminAlreadyExists => StatusCode::CONFLICT,
            Self::Delivery | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer records method/uri/status for every request; only the
        // anyhow chain of an internal error needs logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
