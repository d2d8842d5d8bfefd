//! Session helpers for integration tests.
//!
//! Protected routes expect `Authorization: Bearer <jwt>`. `MockSession` mints
//! tokens with the shared test secret so tests never go through the OTP flow
//! just to call an admin route.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use chrono::{DateTime, Duration, Utc};

use pubportal_auth_types::token::SessionIssuer;
use pubportal_domain::email::Email;

/// Secret used by every test that builds an `AppState` or a `SessionIssuer`.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable session presented on test requests.
pub struct MockSession {
    pub email: Email,
    pub issued_at: DateTime<Utc>,
    pub secret: String,
}

impl MockSession {
    pub fn new(email: &str) -> Self {
        Self {
            email: Email::normalize(email),
            issued_at: Utc::now(),
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    /// A session issued long enough ago that it has expired.
    pub fn expired(email: &str) -> Self {
        Self {
            issued_at: Utc::now() - Duration::days(31),
            ..Self::new(email)
        }
    }

    /// A session signed with a secret the service does not know.
    pub fn forged(email: &str) -> Self {
        Self {
            secret: "forged-secret".to_owned(),
            ..Self::new(email)
        }
    }

    pub fn token(&self) -> String {
        SessionIssuer::new(&self.secret)
            .issue_at(&self.email, self.issued_at)
            .unwrap()
            .token
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token())
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.bearer()).unwrap(),
        );
        map
    }
}
