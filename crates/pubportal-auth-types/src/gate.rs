//! Bearer-token access gate for protected routes.

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::HeaderMap;
use http::request::Parts;

use crate::error::AuthError;
use crate::token::{AuthenticatedIdentity, SessionIssuer};

/// Extract the `Authorization: Bearer <token>` credential and validate it.
///
/// An absent header, or one that is not a bearer credential, is reported as
/// [`AuthError::MissingToken`]. Validation failures propagate unchanged.
pub fn authorize(
    headers: &HeaderMap,
    issuer: &SessionIssuer,
) -> Result<AuthenticatedIdentity, AuthError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AuthError::MissingToken)?;
    issuer.validate(bearer.token())
}

/// Handlers take `AuthenticatedIdentity` as an argument to require a session.
///
/// The identity is also stored in the request extensions for the rest of the
/// request. Authorization beyond "has a session" (e.g. admin checks) is done
/// by handlers after extraction.
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
    SessionIssuer: FromRef<S>,
{
    type Rejection = AuthError;

    // axum-core 0.5 declares this as `fn -> impl Future + Send`, not `async fn`.
    // Validate synchronously and return a 'static async block that borrows nothing.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let issuer = SessionIssuer::from_ref(state);
        let result = authorize(&parts.headers, &issuer);
        match &result {
            Ok(identity) => {
                parts.extensions.insert(identity.clone());
            }
            Err(e) => {
                tracing::debug!(kind = e.kind(), "session rejected");
            }
        }
        async move { result }
    }
}
