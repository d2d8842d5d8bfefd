use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pubportal_auth_types::token::AuthenticatedIdentity;
use pubportal_domain::pagination::PageRequest;

use crate::domain::types::{AdminRecord, AuditLogEntry};
use crate::error::AuthServiceError;
use crate::handlers::otp::MessageResponse;
use crate::state::AppState;
use crate::usecase::admin::{
    AddAdminUseCase, ListAdminsUseCase, ListAuditLogsUseCase, RemoveAdminUseCase,
};

// Row shapes stay snake_case: the portal frontend renders them as-is.

#[derive(Serialize)]
pub struct AdminResponse {
    pub email: String,
    #[serde(serialize_with = "pubportal_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<AdminRecord> for AdminResponse {
    fn from(record: AdminRecord) -> Self {
        Self {
            email: record.email.into_inner(),
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub user_email: String,
    pub action: String,
    pub details: String,
    #[serde(serialize_with = "pubportal_core::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditLogResponse {
    fn from(entry: AuditLogEntry) -> Self {
        Self {
            id: entry.id,
            user_email: entry.user_email,
            action: entry.action,
            details: entry.details,
            timestamp: entry.timestamp,
        }
    }
}

// ── GET /admin/admins ────────────────────────────────────────────────────────

pub async fn list_admins(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
) -> Result<Json<Vec<AdminResponse>>, AuthServiceError> {
    let usecase = ListAdminsUseCase {
        credentials: state.credential_store(),
    };
    let admins = usecase.execute(&identity.user_email).await?;
    Ok(Json(admins.into_iter().map(AdminResponse::from).collect()))
}

// ── POST /admin/admins ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddAdminRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct AddAdminResponse {
    pub email: String,
}

pub async fn add_admin(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Json(body): Json<AddAdminRequest>,
) -> Result<(StatusCode, Json<AddAdminResponse>), AuthServiceError> {
    let usecase = AddAdminUseCase {
        credentials: state.credential_store(),
    };
    let email = usecase.execute(&identity.user_email, &body.email).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddAdminResponse {
            email: email.into_inner(),
        }),
    ))
}

// ── DELETE /admin/admins/{email} ─────────────────────────────────────────────

pub async fn remove_admin(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Path(email): Path<String>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = RemoveAdminUseCase {
        credentials: state.credential_store(),
    };
    usecase.execute(&identity.user_email, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /admin/addAdmin, POST /admin/deleteAdmin (legacy portal) ───────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAddAdminRequest {
    pub add_email: String,
}

pub async fn legacy_add_admin(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Json(body): Json<LegacyAddAdminRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = AddAdminUseCase {
        credentials: state.credential_store(),
    };
    usecase.execute(&identity.user_email, &body.add_email).await?;
    Ok(Json(MessageResponse {
        message: "Admin added successfully",
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRemoveAdminRequest {
    pub delete_email: String,
}

pub async fn legacy_remove_admin(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Json(body): Json<LegacyRemoveAdminRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = RemoveAdminUseCase {
        credentials: state.credential_store(),
    };
    usecase
        .execute(&identity.user_email, &body.delete_email)
        .await?;
    Ok(Json(MessageResponse {
        message: "Admin removed successfully",
    }))
}

// ── GET /admin/logs ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPageResponse {
    pub logs: Vec<AuditLogResponse>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Query(page): Query<PageRequest>,
) -> Result<Json<AuditLogPageResponse>, AuthServiceError> {
    let usecase = ListAuditLogsUseCase {
        credentials: state.credential_store(),
    };
    let result = usecase.execute(&identity.user_email, page).await?;
    Ok(Json(AuditLogPageResponse {
        logs: result.logs.into_iter().map(AuditLogResponse::from).collect(),
        total: result.total,
        page: result.page,
        total_pages: result.total_pages,
    }))
}
