use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use pubportal_auth::domain::repository::{CredentialStore, NotificationSender};
use pubportal_auth::domain::types::{AdminRecord, AuditLogEntry};
use pubportal_auth::error::AuthServiceError;
use pubportal_auth_types::token::SessionIssuer;
use pubportal_domain::audit::AuditAction;
use pubportal_domain::email::Email;
use pubportal_domain::pagination::PageRequest;
use pubportal_testing::auth::TEST_JWT_SECRET;

pub fn test_sessions() -> SessionIssuer {
    SessionIssuer::new(TEST_JWT_SECRET)
}

// ── MockCredentialStore ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCredentialStore {
    pub admins: Arc<Mutex<Vec<AdminRecord>>>,
    pub audit: Arc<Mutex<Vec<(Email, AuditAction, String)>>>,
    pub logs: Vec<AuditLogEntry>,
    /// When set, every audit append fails.
    pub fail_audit: bool,
}

impl MockCredentialStore {
    pub fn with_admins(emails: &[&str]) -> Self {
        let now = Utc::now();
        let admins = emails
            .iter()
            .enumerate()
            .map(|(i, e)| AdminRecord {
                email: Email::normalize(e),
                created_at: now + Duration::seconds(i as i64),
            })
            .collect();
        Self {
            admins: Arc::new(Mutex::new(admins)),
            ..Self::default()
        }
    }

    pub fn failing_audit() -> Self {
        Self {
            fail_audit: true,
            ..Self::default()
        }
    }

    pub fn audit_actions(&self) -> Vec<(Email, AuditAction, String)> {
        self.audit.lock().unwrap().clone()
    }

    pub fn admin_emails(&self) -> Vec<String> {
        self.admins
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.email.as_str().to_owned())
            .collect()
    }
}

impl CredentialStore for MockCredentialStore {
    async fn is_admin(&self, email: &Email) -> Result<bool, AuthServiceError> {
        Ok(self.admins.lock().unwrap().iter().any(|a| &a.email == email))
    }

    async fn append_audit_log(
        &self,
        email: &Email,
        action: AuditAction,
        details: &str,
    ) -> Result<(), AuthServiceError> {
        if self.fail_audit {
            return Err(AuthServiceError::Internal(anyhow::anyhow!("audit store down")));
        }
        self.audit
            .lock()
            .unwrap()
            .push((email.clone(), action, details.to_owned()));
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, AuthServiceError> {
        Ok(self.admins.lock().unwrap().clone())
    }

    async fn add_admin(&self, email: &Email) -> Result<bool, AuthServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| &a.email == email) {
            return Ok(false);
        }
        admins.push(AdminRecord {
            email: email.clone(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_admin(&self, email: &Email) -> Result<bool, AuthServiceError> {
        let mut admins = self.admins.lock().unwrap();
        let before = admins.len();
        admins.retain(|a| &a.email != email);
        Ok(admins.len() < before)
    }

    async fn list_audit_logs(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, u64), AuthServiceError> {
        let rows = self
            .logs
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((rows, self.logs.len() as u64))
    }
}

pub fn audit_rows(count: usize) -> Vec<AuditLogEntry> {
    let now = Utc::now();
    (0..count)
        .map(|i| AuditLogEntry {
            id: (count - i) as i64,
            user_email: "user@x.com".into(),
            action: "LOGIN".into(),
            details: "User logged in via OTP".into(),
            timestamp: now - Duration::minutes(i as i64),
        })
        .collect()
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: Email,
    pub subject: String,
    pub html: String,
}

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSender for MockMailer {
    async fn send(&self, to: &Email, subject: &str, html: &str) -> Result<(), AuthServiceError> {
        if self.fail {
            return Err(AuthServiceError::Delivery);
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.clone(),
            subject: subject.to_owned(),
            html: html.to_owned(),
        });
        Ok(())
    }
}
