use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;

use super::parse_topic_id;
use crate::auth::{Identity, Permission};
use crate::database::models::{NewTopic, Topic, TopicUpdate};
use crate::error::ApiError;
use crate::handlers::validate::FieldErrors;
use crate::middleware::{require, ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "curso")]
    pub course: String,
}

impl TopicRequest {
    fn validate(&self) -> Result<(), ApiError> {
        FieldErrors::new()
            .not_blank("titulo", &self.title)
            .not_blank("mensagem", &self.message)
            .not_blank("curso", &self.course)
            .finish("Invalid topic")
    }
}

fn topic_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Topic {} not found", id))
}

/// GET /topicos - List all topics, oldest first
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<Topic>> {
    require(&identity, Permission::TopicRead)?;
    let topics = state.store.list_topics().await?;
    Ok(ApiResponse::success(topics))
}

/// POST /topicos - Open a topic authored by the caller
///
/// ```json
/// { "titulo": "...", "mensagem": "...", "curso": "..." }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<TopicRequest>,
) -> ApiResult<Topic> {
    require(&identity, Permission::TopicWrite)?;
    payload.validate()?;

    let topic = state
        .store
        .create_topic(NewTopic {
            title: payload.title,
            message: payload.message,
            course: payload.course,
            author_id: identity.user_id,
        })
        .await?;

    tracing::info!("User {} opened topic {}", identity.user_id, topic.id);
    Ok(ApiResponse::created(topic))
}

/// GET /topicos/:id - Fetch one topic
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Topic> {
    require(&identity, Permission::TopicRead)?;
    let id = parse_topic_id(&id)?;

    let topic = state.store.find_topic(id).await?.ok_or_else(|| topic_not_found(id))?;
    Ok(ApiResponse::success(topic))
}

/// PUT /topicos/:id - Overwrite title and message
///
/// The body carries `curso` as well, but the course a topic was opened under
/// is kept. Any authenticated member may edit any topic; edits by someone
/// other than the author are logged.
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<TopicRequest>,
) -> ApiResult<Topic> {
    require(&identity, Permission::TopicWrite)?;
    let id = parse_topic_id(&id)?;
    payload.validate()?;

    let topic = state
        .store
        .update_topic(
            id,
            TopicUpdate {
                title: payload.title,
                message: payload.message,
            },
        )
        .await?
        .ok_or_else(|| topic_not_found(id))?;

    if topic.author_id != identity.user_id {
        tracing::info!(
            "Topic {} edited by user {} (author {})",
            id,
            identity.user_id,
            topic.author_id
        );
    }

    Ok(ApiResponse::success(topic))
}

/// DELETE /topicos/:id - Delete a topic and its replies
///
/// Deleting an id that does not exist (including a second delete) is a 404.
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    require(&identity, Permission::TopicWrite)?;
    let id = parse_topic_id(&id)?;

    let author = state.store.find_topic(id).await?.map(|t| t.author_id);
    if !state.store.delete_topic(id).await? {
        return Err(topic_not_found(id));
    }

    if author != Some(identity.user_id) {
        tracing::info!("Topic {} deleted by user {} (author {:?})", id, identity.user_id, author);
    }

    Ok(ApiResponse::no_content())
}
