use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use pubportal_auth_types::token::SessionIssuer;

use crate::infra::db::DbCredentialStore;
use crate::infra::ledger::OtpBackend;
use crate::infra::mailer::Mailer;

/// Shared application state passed to every handler via axum `State`.
///
/// The connection sits behind an `Arc`: `DatabaseConnection` is only `Clone`
/// when sea-orm's `mock` feature is off.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub otp_store: OtpBackend,
    pub mailer: Mailer,
    pub sessions: SessionIssuer,
}

impl AppState {
    pub fn credential_store(&self) -> DbCredentialStore {
        DbCredentialStore {
            db: Arc::clone(&self.db),
        }
    }
}

/// Lets the `AuthenticatedIdentity` extractor find the issuer.
impl FromRef<AppState> for SessionIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
