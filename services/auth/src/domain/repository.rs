#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use pubportal_domain::audit::AuditAction;
use pubportal_domain::email::Email;
use pubportal_domain::pagination::PageRequest;

use crate::domain::types::{AdminRecord, AuditLogEntry, OtpEntry};
use crate::error::AuthServiceError;

/// Ledger of pending one-time passcodes, at most one per email.
pub trait OtpStore: Send + Sync {
    /// Store `entry` under `email`, replacing any pending entry (last request wins).
    async fn put(&self, email: &Email, entry: OtpEntry) -> Result<(), AuthServiceError>;

    /// Check `code` against the pending entry and consume it, as one atomic step.
    ///
    /// - no entry: `OtpNotFound`
    /// - `now` past expiry: entry removed, `OtpExpired`
    /// - wrong code: entry kept, `OtpMismatch`
    /// - match: entry removed, `Ok(())`
    ///
    /// Two concurrent calls with the same correct code never both succeed.
    async fn consume(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    /// Drop every entry already expired at `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Outbound channel that delivers the passcode to its owner.
pub trait NotificationSender: Send + Sync {
    /// Fails with `Delivery` when the message could not be handed off.
    async fn send(&self, to: &Email, subject: &str, html: &str) -> Result<(), AuthServiceError>;
}

/// Admin allow-list and audit trail.
pub trait CredentialStore: Send + Sync {
    async fn is_admin(&self, email: &Email) -> Result<bool, AuthServiceError>;

    async fn append_audit_log(
        &self,
        email: &Email,
        action: AuditAction,
        details: &str,
    ) -> Result<(), AuthServiceError>;

    /// All admins, oldest first.
    async fn list_admins(&self) -> Result<Vec<AdminRecord>, AuthServiceError>;

    /// Returns `false` if the email was already an admin.
    async fn add_admin(&self, email: &Email) -> Result<bool, AuthServiceError>;

    /// Returns `false` if the email was not an admin.
    async fn remove_admin(&self, email: &Email) -> Result<bool, AuthServiceError>;

    /// One page of the audit trail, newest first, plus the total row count.
    async fn list_audit_logs(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, u64), AuthServiceError>;
}
