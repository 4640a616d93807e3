use axum::{extract::Request, http::Method, middleware::Next, response::Response};

use crate::auth::{Identity, Permission};
use crate::error::ApiError;

/// Whether a route may be called without an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// Routes open to anonymous callers: login and user registration.
/// Everything else requires an identity attached by the auth middleware.
const PUBLIC_ROUTES: &[(&str, &str)] = &[("POST", "/auth"), ("POST", "/usuarios")];

pub fn classify(method: &Method, path: &str) -> Access {
    if PUBLIC_ROUTES
        .iter()
        .any(|(m, p)| *m == method.as_str() && *p == path)
    {
        Access::Public
    } else {
        Access::Authenticated
    }
}

/// Reject requests to protected routes that carry no identity.
///
/// Stateless: no session is consulted or created; the identity comes solely
/// from this request's bearer token.
pub async fn enforce(request: Request, next: Next) -> Result<Response, ApiError> {
    let access = classify(request.method(), request.uri().path());

    if access == Access::Authenticated && request.extensions().get::<Identity>().is_none() {
        tracing::debug!(
            "Rejecting unauthenticated {} {}",
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::unauthorized("Authentication required"));
    }

    Ok(next.run(request).await)
}

/// Check a permission flag on the caller's identity.
pub fn require(identity: &Identity, permission: Permission) -> Result<(), ApiError> {
    if identity.can(permission) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!("Missing permission {:?}", permission)))
    }
}
