use anyhow::Context as _;
use chrono::{DateTime, Utc};
use rand::RngExt;

use pubportal_auth_types::token::{SessionIssuer, SessionToken};
use pubportal_domain::audit::AuditAction;
use pubportal_domain::email::Email;

use crate::domain::repository::{CredentialStore, NotificationSender, OtpStore};
use crate::domain::types::{OTP_MAIL_SUBJECT, OTP_MAX, OTP_MIN, OtpEntry};
use crate::error::AuthServiceError;

const OTP_MAIL_TEMPLATE: &str = include_str!("../../templates/otp_mail.html");
const OTP_PLACEHOLDER: &str = "{{OTP}}";

const LOGIN_AUDIT_DETAILS: &str = "User logged in via OTP";

fn generate_code() -> String {
    let code = rand::rng().random_range(OTP_MIN..=OTP_MAX);
    format!("{code:06}")
}

/// Mail body with every `{{OTP}}` placeholder replaced by `code`.
pub fn render_otp_mail(code: &str) -> String {
    OTP_MAIL_TEMPLATE.replace(OTP_PLACEHOLDER, code)
}

// ── RequestCode ──────────────────────────────────────────────────────────────

pub struct RequestCodeInput {
    /// Raw email as submitted; lower-cased before use.
    pub email: String,
}

pub struct RequestCodeUseCase<S, N>
where
    S: OtpStore,
    N: NotificationSender,
{
    pub otp_store: S,
    pub mailer: N,
}

impl<S, N> RequestCodeUseCase<S, N>
where
    S: OtpStore,
    N: NotificationSender,
{
    pub async fn execute(&self, input: RequestCodeInput) -> Result<(), AuthServiceError> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: RequestCodeInput,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let email = Email::normalize(&input.email);
        let code = generate_code();

        // Stored before delivery: a failed send leaves a valid entry behind.
        self.otp_store
            .put(&email, OtpEntry::issue(code.clone(), now))
            .await?;

        let body = render_otp_mail(&code);
        self.mailer.send(&email, OTP_MAIL_SUBJECT, &body).await?;
        tracing::info!(email = %email, "otp issued");
        Ok(())
    }
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

pub struct VerifyCodeInput {
    pub email: String,
    pub code: String,
}

#[derive(Debug)]
pub struct VerifyCodeOutput {
    pub email: Email,
    pub session: SessionToken,
}

pub struct VerifyCodeUseCase<S, C>
where
    S: OtpStore,
    C: CredentialStore,
{
    pub otp_store: S,
    pub credentials: C,
    pub sessions: SessionIssuer,
}

impl<S, C> VerifyCodeUseCase<S, C>
where
    S: OtpStore,
    C: CredentialStore,
{
    pub async fn execute(&self, input: VerifyCodeInput) -> Result<VerifyCodeOutput, AuthServiceError> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: VerifyCodeInput,
        now: DateTime<Utc>,
    ) -> Result<VerifyCodeOutput, AuthServiceError> {
        let email = Email::normalize(&input.email);

        self.otp_store.consume(&email, &input.code, now).await?;

        let session = self
            .sessions
            .issue_at(&email, now)
            .context("sign session token")?;

        // Best-effort: an audit outage must not block sign-in.
        if let Err(e) = self
            .credentials
            .append_audit_log(&email, AuditAction::Login, LOGIN_AUDIT_DETAILS)
            .await
        {
            tracing::warn!(error = %e, email = %email, "failed to record login audit log");
        }

        tracing::info!(email = %email, "otp verified, session issued");
        Ok(VerifyCodeOutput { email, session })
    }
}
