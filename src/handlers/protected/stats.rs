use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};

use crate::auth::{Identity, Permission};
use crate::database::models::ForumStats;
use crate::middleware::{require, ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /stats - Forum counters
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ForumStats> {
    require(&identity, Permission::TopicRead)?;
    let stats = state.store.stats(start_of_day(Utc::now())).await?;
    Ok(ApiResponse::success(stats))
}

/// Midnight UTC of the day containing `now`.
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
