use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};

use pubportal_core::health::{healthz, readiness};
use pubportal_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    admin::{
        add_admin, legacy_add_admin, legacy_remove_admin, list_admins, list_audit_logs,
        remove_admin,
    },
    otp::{request_code, verify_code},
    session::{get_session, is_admin},
};
use crate::state::AppState;

/// `GET /readyz`: ready once the database answers.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // OTP
        .route("/auth/otp/request", post(request_code))
        .route("/auth/otp/verify", post(verify_code))
        // Session
        .route("/auth/session", get(get_session))
        // Admin
        .route("/admin/admins", get(list_admins).post(add_admin))
        .route("/admin/admins/{email}", delete(remove_admin))
        .route("/admin/logs", get(list_audit_logs))
        // Legacy portal paths
        .route("/login/otpSend", post(request_code))
        .route("/login/otpVerify", post(verify_code))
        .route("/form/isAdmin", post(is_admin))
        .route("/admin/allAdmins", get(list_admins))
        .route("/admin/addAdmin", post(legacy_add_admin))
        .route("/admin/deleteAdmin", post(legacy_remove_admin))
        .with_state(state)
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
