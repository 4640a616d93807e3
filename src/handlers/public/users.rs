use axum::extract::State;
use serde::Deserialize;

use crate::auth::hash_password;
use crate::database::models::{NewUser, UserView};
use crate::handlers::validate::{FieldErrors, MIN_PASSWORD_LENGTH};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// POST /usuarios - Register a new account
///
/// ```json
/// { "nome": "Ana", "email": "ana@forum.dev", "senha": "at-least-8" }
/// ```
///
/// 201 with the public user view; 409 when the email is already taken.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<UserView> {
    let email = payload.email.trim().to_string();

    FieldErrors::new()
        .not_blank("nome", &payload.name)
        .email("email", &email)
        .min_len("senha", &payload.password, MIN_PASSWORD_LENGTH)
        .finish("Invalid registration")?;

    let password_hash = hash_password(&payload.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {} <{}>", user.id, user.email);
    Ok(ApiResponse::created(UserView::from(&user)))
}
