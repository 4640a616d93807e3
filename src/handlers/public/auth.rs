use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{verify_password, UNKNOWN_USER_HASH};
use crate::error::ApiError;
use crate::handlers::validate::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "tipo")]
    pub token_type: &'static str,
    #[serde(rename = "expiraEm")]
    pub expires_at: DateTime<Utc>,
}

/// POST /auth - Exchange email and password for a bearer token
///
/// ```json
/// { "email": "ana@forum.dev", "senha": "..." }
/// ```
///
/// Unknown email and wrong password produce the same 401, and both pay for
/// one Argon2 verification, so neither the body nor the timing reveals which
/// accounts exist.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let email = payload.email.trim();

    FieldErrors::new()
        .not_blank("email", email)
        .not_blank("senha", &payload.password)
        .finish("Invalid login request")?;

    let Some(user) = state.store.find_user_by_email(email).await? else {
        verify_password(&payload.password, UNKNOWN_USER_HASH).await?;
        tracing::info!("Login failed: unknown email '{}'", email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.password_hash).await? {
        tracing::info!("Login failed: wrong password for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state.tokens.issue(&user.email)?;
    tracing::info!("Issued token for user {}", user.id);

    Ok(ApiResponse::success(TokenResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
    }))
}
