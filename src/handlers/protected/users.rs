use axum::{extract::State, Extension};

use crate::auth::Identity;
use crate::database::models::UserView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /usuarios/me - The account behind the presented token
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<UserView> {
    let user = state
        .store
        .find_user_by_id(identity.user_id)
        .await?
        .ok_or_else(|| ApiError::identity_not_found("The user this token was issued to no longer exists"))?;

    Ok(ApiResponse::success(UserView::from(&user)))
}
