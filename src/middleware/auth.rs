use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer-token authentication, run once per request ahead of routing policy.
///
/// - no header, or not a `Bearer ` header: pass through unauthenticated
/// - token fails validation: pass through unauthenticated
/// - valid token, user gone: fail the request with `IDENTITY_NOT_FOUND`
/// - valid token, user found: attach an [`Identity`] to the request extensions
///
/// Rejecting unauthenticated requests is the policy middleware's job.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return Ok(next.run(request).await);
    };

    match state.tokens.validate(&token) {
        Ok(email) => {
            let user = state.store.find_user_by_email(&email).await?.ok_or_else(|| {
                tracing::warn!("Valid token for unknown user '{}'", email);
                ApiError::identity_not_found("The user this token was issued to no longer exists")
            })?;

            let identity = Identity::for_user(&user);
            tracing::debug!("Authenticated {} (id {})", identity.email, identity.user_id);
            request.extensions_mut().insert(identity);
        }
        Err(e) => {
            tracing::debug!("Ignoring bearer token: {}", e);
        }
    }

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`, if present.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix(BEARER_PREFIX).map(|token| token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::NewUser;
    use crate::database::{CredentialStore, MemoryStore};

    async fn whoami(identity: Option<Extension<Identity>>) -> String {
        match identity {
            Some(Extension(identity)) => identity.email,
            None => "anonymous".to_string(),
        }
    }

    async fn harness() -> (Router, AppState) {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(NewUser {
                name: "Ana".to_string(),
                email: "ana@forum.dev".to_string(),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();

        let state = AppState::new(AppConfig::for_memory("test-secret"), store).unwrap();
        let router = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state.clone());
        (router, state)
    }

    async fn call(router: Router, authorization: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn no_header_passes_through_unauthenticated() {
        let (router, _) = harness().await;
        assert_eq!(call(router, None).await, (StatusCode::OK, "anonymous".to_string()));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_ignored() {
        let (router, _) = harness().await;
        let (status, body) = call(router, Some("Basic YW5hOnNlbmhh".to_string())).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let (router, state) = harness().await;
        let issued = state.tokens.issue("ana@forum.dev").unwrap();
        let (status, body) = call(router, Some(format!("Bearer {}", issued.token))).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "ana@forum.dev"));
    }

    #[tokio::test]
    async fn expired_token_passes_through_unauthenticated() {
        let (router, state) = harness().await;
        let issued = state
            .tokens
            .issue_at("ana@forum.dev", Utc::now() - Duration::days(2))
            .unwrap();
        let (status, body) = call(router, Some(format!("Bearer {}", issued.token))).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));
    }

    #[tokio::test]
    async fn garbage_token_passes_through_unauthenticated() {
        let (router, _) = harness().await;
        let (status, body) = call(router, Some("Bearer definitely-not-a-jwt".to_string())).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));
    }

    #[tokio::test]
    async fn valid_token_for_missing_user_fails_the_request() {
        let (router, state) = harness().await;
        let issued = state.tokens.issue("ghost@forum.dev").unwrap();
        let (status, body) = call(router, Some(format!("Bearer {}", issued.token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("IDENTITY_NOT_FOUND"));
    }

    #[test]
    fn bearer_prefix_is_case_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc"));
    }
}
