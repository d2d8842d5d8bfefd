use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};

use pubportal_domain::email::Email;

use crate::domain::repository::OtpStore;
use crate::domain::types::{OTP_EXPIRED_GRACE_SECS, OtpEntry};
use crate::error::AuthServiceError;

/// Looks up, checks and removes an entry in one server-side step, so nothing
/// can replace the key between the check and the `DEL`.
///
/// `KEYS[1]` is the entry key, `ARGV[1]` the submitted code and `ARGV[2]` the
/// current time in epoch milliseconds. See [`ConsumeReply`] for the result.
const CONSUME_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then return 0 end
local sep = string.find(raw, ':', 1, true)
if not sep then return -1 end
local expires_ms = tonumber(string.sub(raw, sep + 1))
if not expires_ms then return -1 end
if tonumber(ARGV[2]) > expires_ms then
  redis.call('DEL', KEYS[1])
  return 2
end
if string.sub(raw, 1, sep - 1) ~= ARGV[1] then return 3 end
redis.call('DEL', KEYS[1])
return 1
"#;

/// Redis-backed OTP ledger, shared by every auth instance.
#[derive(Clone)]
pub struct RedisOtpStore {
    pub pool: Pool,
}

/// Outcome reported by [`CONSUME_SCRIPT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsumeReply {
    Missing,
    Consumed,
    Expired,
    Mismatch,
    Corrupt,
}

impl ConsumeReply {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Missing),
            1 => Some(Self::Consumed),
            2 => Some(Self::Expired),
            3 => Some(Self::Mismatch),
            -1 => Some(Self::Corrupt),
            _ => None,
        }
    }

    fn into_result(self) -> Result<(), AuthServiceError> {
        match self {
            Self::Consumed => Ok(()),
            Self::Missing => Err(AuthServiceError::OtpNotFound),
            Self::Expired => Err(AuthServiceError::OtpExpired),
            Self::Mismatch => Err(AuthServiceError::OtpMismatch),
            Self::Corrupt => Err(AuthServiceError::Internal(anyhow::anyhow!(
                "corrupt otp entry"
            ))),
        }
    }
}

fn otp_key(email: &Email) -> String {
    format!("otp:{}", email)
}

/// Stored as `"{code}:{expires_at_ms}"`.
fn encode_entry(entry: &OtpEntry) -> String {
    format!("{}:{}", entry.code, entry.expires_at.timestamp_millis())
}

/// Keys outlive their logical expiry by the grace window so an attempt made
/// just after expiry still sees the entry and reports `OtpExpired`.
fn key_ttl_secs(entry: &OtpEntry, now: DateTime<Utc>) -> u64 {
    let remaining = (entry.expires_at - now).num_seconds().max(0);
    (remaining + OTP_EXPIRED_GRACE_SECS) as u64
}

fn redis_error(e: redis::RedisError) -> AuthServiceError {
    AuthServiceError::Internal(e.into())
}

impl OtpStore for RedisOtpStore {
    async fn put(&self, email: &Email, entry: OtpEntry) -> Result<(), AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let ttl = key_ttl_secs(&entry, Utc::now());
        let (): () = conn
            .set_ex(otp_key(email), encode_entry(&entry), ttl)
            .await
            .map_err(redis_error)?;
        Ok(())
    }

    async fn consume(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let reply: i64 = redis::cmd("EVAL")
            .arg(CONSUME_SCRIPT)
            .arg(1)
            .arg(otp_key(email))
            .arg(code)
            .arg(now.timestamp_millis())
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        ConsumeReply::from_code(reply)
            .ok_or_else(|| {
                AuthServiceError::Internal(anyhow::anyhow!("unexpected consume reply {reply}"))
            })?
            .into_result()
    }

    /// Redis expires keys on its own.
    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        Ok(0)
    }
}
