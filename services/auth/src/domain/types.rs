use chrono::{DateTime, Duration, Utc};

use pubportal_domain::email::Email;

/// A pending one-time passcode for one email.
///
/// Never mutated in place: a new request replaces the entry, a successful or
/// expired verification removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEntry {
    /// 6-digit numeric string.
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpEntry {
    pub fn issue(code: String, now: DateTime<Utc>) -> Self {
        Self {
            code,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
        }
    }

    /// Expired strictly after `expires_at`; a check at exactly `expires_at`
    /// still passes.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Safe to drop once the grace window has also passed. Until then a late
    /// attempt still finds the entry and is told `OtpExpired`.
    pub fn is_purgeable_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at + Duration::seconds(OTP_EXPIRED_GRACE_SECS)
    }
}

/// Entry in the admin allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// Row of the audit trail. `action` stays a string because rows written by
/// the legacy portal use actions this service never emits (e.g. `DELETE_ALL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_email: String,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// OTP time-to-live in seconds (5 minutes).
pub const OTP_TTL_SECS: i64 = 300;

/// How long an expired entry is kept around (1 hour) so that late attempts
/// report expiry rather than a missing code.
pub const OTP_EXPIRED_GRACE_SECS: i64 = 3600;

/// Inclusive range the numeric OTP is drawn from.
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Subject line of the OTP mail.
pub const OTP_MAIL_SUBJECT: &str = "OTP for NRI publications portal";
