use pubportal_domain::audit::AuditAction;
use pubportal_domain::email::Email;
use pubportal_domain::pagination::PageRequest;

use crate::domain::repository::CredentialStore;
use crate::domain::types::{AdminRecord, AuditLogEntry};
use crate::error::AuthServiceError;

async fn ensure_admin<C: CredentialStore>(
    credentials: &C,
    caller: &Email,
) -> Result<(), AuthServiceError> {
    if credentials.is_admin(caller).await? {
        Ok(())
    } else {
        Err(AuthServiceError::Forbidden)
    }
}

/// Parse an admin email typed into the admin panel: trimmed, lower-cased,
/// must look like an address.
fn parse_admin_email(raw: &str) -> Result<Email, AuthServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AuthServiceError::InvalidEmail);
    }
    Ok(Email::normalize(trimmed))
}

async fn audit_best_effort<C: CredentialStore>(
    credentials: &C,
    actor: &Email,
    action: AuditAction,
    details: &str,
) {
    if let Err(e) = credentials.append_audit_log(actor, action, details).await {
        tracing::warn!(error = %e, actor = %actor, action = action.as_str(), "failed to record audit log");
    }
}

// ── CheckAdmin ───────────────────────────────────────────────────────────────

pub struct CheckAdminUseCase<C: CredentialStore> {
    pub credentials: C,
}

impl<C: CredentialStore> CheckAdminUseCase<C> {
    pub async fn execute(&self, caller: &Email) -> Result<bool, AuthServiceError> {
        self.credentials.is_admin(caller).await
    }
}

// ── ListAdmins ───────────────────────────────────────────────────────────────

pub struct ListAdminsUseCase<C: CredentialStore> {
    pub credentials: C,
}

impl<C: CredentialStore> ListAdminsUseCase<C> {
    pub async fn execute(&self, caller: &Email) -> Result<Vec<AdminRecord>, AuthServiceError> {
        ensure_admin(&self.credentials, caller).await?;
        self.credentials.list_admins().await
    }
}

// ── AddAdmin ─────────────────────────────────────────────────────────────────

pub struct AddAdminUseCase<C: CredentialStore> {
    pub credentials: C,
}

impl<C: CredentialStore> AddAdminUseCase<C> {
    pub async fn execute(&self, caller: &Email, raw_email: &str) -> Result<Email, AuthServiceError> {
        ensure_admin(&self.credentials, caller).await?;
        let email = parse_admin_email(raw_email)?;

        if !self.credentials.add_admin(&email).await? {
            return Err(AuthServiceError::AdminAlreadyExists);
        }
        tracing::info!(actor = %caller, admin = %email, "admin added");
        audit_best_effort(
            &self.credentials,
            caller,
            AuditAction::AddAdmin,
            &format!("Added admin {email}"),
        )
        .await;
        Ok(email)
    }
}

// ── RemoveAdmin ──────────────────────────────────────────────────────────────

pub struct RemoveAdminUseCase<C: CredentialStore> {
    pub credentials: C,
}

impl<C: CredentialStore> RemoveAdminUseCase<C> {
    pub async fn execute(&self, caller: &Email, raw_email: &str) -> Result<(), AuthServiceError> {
        ensure_admin(&self.credentials, caller).await?;
        if caller.same_address(raw_email) {
            return Err(AuthServiceError::CannotRemoveSelf);
        }
        let email = parse_admin_email(raw_email)?;

        if !self.credentials.remove_admin(&email).await? {
            return Err(AuthServiceError::AdminNotFound);
        }
        tracing::info!(actor = %caller, admin = %email, "admin removed");
        audit_best_effort(
            &self.credentials,
            caller,
            AuditAction::RemoveAdmin,
            &format!("Removed admin {email}"),
        )
        .await;
        Ok(())
    }
}

// ── ListAuditLogs ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AuditLogPage {
    pub logs: Vec<AuditLogEntry>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

pub struct ListAuditLogsUseCase<C: CredentialStore> {
    pub credentials: C,
}

impl<C: CredentialStore> ListAuditLogsUseCase<C> {
    pub async fn execute(
        &self,
        caller: &Email,
        page: PageRequest,
    ) -> Result<AuditLogPage, AuthServiceError> {
        ensure_admin(&self.credentials, caller).await?;
        let page = page.clamped();
        let (logs, total) = self.credentials.list_audit_logs(page).await?;
        Ok(AuditLogPage {
            logs,
            total,
            page: page.page,
            total_pages: page.total_pages(total),
        })
    }
}

// ── BootstrapAdmin ───────────────────────────────────────────────────────────

/// Seed the first admin at startup so a fresh deployment has someone who can
/// manage the allow-list.
pub struct BootstrapAdminUseCase<C: CredentialStore> {
    pub credentials: C,
}

impl<C: CredentialStore> BootstrapAdminUseCase<C> {
    /// Returns `true` if the admin was inserted, `false` if already present.
    pub async fn execute(&self, raw_email: &str) -> Result<bool, AuthServiceError> {
        let email = parse_admin_email(raw_email)?;
        let seeded = self.credentials.add_admin(&email).await?;
        if seeded {
            tracing::info!(admin = %email, "bootstrap admin seeded");
        } else {
            tracing::info!(admin = %email, "bootstrap admin already present");
        }
        Ok(seeded)
    }
}
