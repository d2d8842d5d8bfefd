use std::time::Duration;

use anyhow::{Context as _, bail};

const DEFAULT_AUTH_PORT: u16 = 3000;
const DEFAULT_MAIL_FROM: &str = "no-reply@localhost";
const DEFAULT_OTP_REAPER_INTERVAL_SECS: u64 = 60;

/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens. Must be non-empty.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3000). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Redis URL; when set the OTP ledger is shared through Redis.
    pub redis_url: Option<String>,
    /// Mail relay endpoint; when unset mail is only logged.
    pub mail_relay_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    /// Admin seeded at startup if missing.
    pub bootstrap_admin_email: Option<String>,
    /// `None` disables the in-memory OTP reaper (`OTP_REAPER_INTERVAL_SECS=0`).
    pub otp_reaper_interval: Option<Duration>,
    /// Browser origins allowed by CORS (`CORS_ALLOWED_ORIGINS`, comma-separated).
    pub cors_allowed_origins: Vec<String>,
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{key} must be set"));

        let auth_port = match get("AUTH_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid AUTH_PORT: {v}"))?,
            None => DEFAULT_AUTH_PORT,
        };
        let reaper_secs = match get("OTP_REAPER_INTERVAL_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid OTP_REAPER_INTERVAL_SECS: {v}"))?,
            None => DEFAULT_OTP_REAPER_INTERVAL_SECS,
        };
        let mail_api_key = get("MAIL_API_KEY");
        let mail_relay_url = get("MAIL_RELAY_URL");
        if mail_api_key.is_some() && mail_relay_url.is_none() {
            bail!("MAIL_API_KEY is set but MAIL_RELAY_URL is not");
        }

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            auth_port,
            redis_url: get("REDIS_URL"),
            mail_relay_url,
            mail_api_key,
            mail_from: get("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_owned()),
            bootstrap_admin_email: get("BOOTSTRAP_ADMIN_EMAIL"),
            otp_reaper_interval: (reaper_secs > 0).then(|| Duration::from_secs(reaper_secs)),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
