//! Session token issuance and validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use pubportal_domain::email::Email;

use crate::error::AuthError;

/// Session lifetime in seconds (30 days).
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `user_email` | `userEmail` | normalized email of the session owner |
/// | `iat` | `iat` | issue time, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
///
/// `userEmail` keeps the claim name used by tokens from the legacy portal so
/// existing browser sessions stay valid.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub iat: u64,
    pub exp: u64,
}

/// A freshly minted session credential.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Caller identity extracted from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_email: Email,
    pub expires_at: DateTime<Utc>,
}

/// Signs and validates session tokens with a single process-wide HMAC secret.
///
/// Built once at startup from `JWT_SECRET` and shared read-only; there is no
/// rotation and no revocation list, expiry is the only way a token dies.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer").finish_non_exhaustive()
    }
}

fn epoch_secs(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}

impl SessionIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, email: &Email) -> Result<SessionToken, jsonwebtoken::errors::Error> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, jsonwebtoken::errors::Error> {
        let expires_at = now + Duration::seconds(SESSION_TTL_SECS);
        let claims = SessionClaims {
            user_email: email.as_str().to_owned(),
            iat: epoch_secs(now),
            exp: epoch_secs(expires_at),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(SessionToken { token, expires_at })
    }

    /// Validate signature and expiry, returning the embedded identity.
    ///
    /// Validation: HS256, `exp` required and checked with the default 60s
    /// leeway.
    pub fn validate(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;

        let exp = i64::try_from(data.claims.exp).map_err(|_| AuthError::Malformed)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::Malformed)?;
        Ok(AuthenticatedIdentity {
            user_email: Email::normalize(&data.claims.user_email),
            expires_at,
        })
    }
}
