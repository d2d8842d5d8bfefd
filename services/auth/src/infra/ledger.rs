use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use pubportal_domain::email::Email;

use crate::domain::repository::OtpStore;
use crate::domain::types::OtpEntry;
use crate::error::AuthServiceError;
use crate::infra::cache::RedisOtpStore;

// ── In-process ledger ─────────────────────────────────────────────────────────

/// Process-local OTP ledger. Not shared across instances, lost on restart.
///
/// One mutex guards the whole map, so `consume` runs its lookup, expiry check
/// and delete under a single lock.
#[derive(Clone, Default)]
pub struct MemoryOtpStore {
    entries: Arc<Mutex<HashMap<Email, OtpEntry>>>,
}

impl MemoryOtpStore {
    // The map holds no cross-entry invariant a panicking holder could break.
    fn lock(&self) -> MutexGuard<'_, HashMap<Email, OtpEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the pending entry for `email`, if any.
    pub fn pending(&self, email: &Email) -> Option<OtpEntry> {
        self.lock().get(email).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl OtpStore for MemoryOtpStore {
    async fn put(&self, email: &Email, entry: OtpEntry) -> Result<(), AuthServiceError> {
        self.lock().insert(email.clone(), entry);
        Ok(())
    }

    async fn consume(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let mut entries = self.lock();
        let entry = entries.get(email).ok_or(AuthServiceError::OtpNotFound)?;
        if entry.is_expired_at(now) {
            entries.remove(email);
            return Err(AuthServiceError::OtpExpired);
        }
        if entry.code != code {
            return Err(AuthServiceError::OtpMismatch);
        }
        entries.remove(email);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_purgeable_at(now));
        Ok((before - entries.len()) as u64)
    }
}

/// Periodically purge long-expired entries so abandoned requests do not pile up.
///
/// Only entries past their grace window go, so a verify that arrives after
/// expiry reports `OtpExpired` whether or not a tick ran in between.
pub fn spawn_otp_reaper(store: MemoryOtpStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "purged expired otp entries"),
                Err(e) => tracing::warn!(error = %e, "otp purge failed"),
            }
        }
    })
}

// ── Backend selection ────────────────────────────────────────────────────────

/// OTP ledger chosen at startup: in-process by default, Redis when
/// `REDIS_URL` is configured so several instances can share it.
#[derive(Clone)]
pub enum OtpBackend {
    Memory(MemoryOtpStore),
    Redis(RedisOtpStore),
}

impl OtpStore for OtpBackend {
    async fn put(&self, email: &Email, entry: OtpEntry) -> Result<(), AuthServiceError> {
        match self {
            Self::Memory(store) => store.put(email, entry).await,
            Self::Redis(store) => store.put(email, entry).await,
        }
    }

    async fn consume(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        match self {
            Self::Memory(store) => store.consume(email, code, now).await,
            Self::Redis(store) => store.consume(email, code, now).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        match self {
            Self::Memory(store) => store.purge_expired(now).await,
            Self::Redis(store) => store.purge_expired(now).await,
        }
    }
}
