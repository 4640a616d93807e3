use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;

use super::parse_topic_id;
use crate::auth::{Identity, Permission};
use crate::database::models::{NewReply, Reply};
use crate::error::ApiError;
use crate::handlers::validate::FieldErrors;
use crate::middleware::{require, ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(rename = "mensagem")]
    pub message: String,
}

/// GET /topicos/:id/replies - Replies of a topic, oldest first
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Reply>> {
    require(&identity, Permission::TopicRead)?;
    let topic_id = parse_topic_id(&id)?;

    if state.store.find_topic(topic_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Topic {} not found", topic_id)));
    }

    let replies = state.store.list_replies(topic_id).await?;
    Ok(ApiResponse::success(replies))
}

/// POST /topicos/:id/replies - Reply to a topic
///
/// Recording a reply marks the topic as answered.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ReplyRequest>,
) -> ApiResult<Reply> {
    require(&identity, Permission::ReplyWrite)?;
    let topic_id = parse_topic_id(&id)?;

    FieldErrors::new()
        .not_blank("mensagem", &payload.message)
        .finish("Invalid reply")?;

    let reply = state
        .store
        .create_reply(NewReply {
            message: payload.message,
            author_id: identity.user_id,
            topic_id,
        })
        .await?;

    tracing::info!("User {} replied to topic {}", identity.user_id, topic_id);
    Ok(ApiResponse::created(reply))
}
