use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{
    ForumStats, NewReply, NewTopic, NewUser, Reply, Topic, TopicUpdate, User,
};

/// Errors from a credential store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for users, topics and replies.
///
/// Each call is atomic on its own; nothing spans calls. Referential integrity
/// (topic and reply authors, reply topics) is enforced here, not by callers.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. A taken email is a `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Remove a user. Returns `false` when no such user existed.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    /// All topics, oldest first.
    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError>;

    /// Insert a topic as NOT_ANSWERED, stamped with the current time.
    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StoreError>;

    async fn find_topic(&self, id: i64) -> Result<Option<Topic>, StoreError>;

    /// Overwrite title and message. `None` when the topic does not exist.
    async fn update_topic(&self, id: i64, update: TopicUpdate) -> Result<Option<Topic>, StoreError>;

    /// Delete a topic and its replies. Returns `false` when nothing was deleted.
    async fn delete_topic(&self, id: i64) -> Result<bool, StoreError>;

    /// Replies of a topic, oldest first.
    async fn list_replies(&self, topic_id: i64) -> Result<Vec<Reply>, StoreError>;

    /// Insert a reply and mark its topic ANSWERED. Missing topic is `NotFound`.
    async fn create_reply(&self, reply: NewReply) -> Result<Reply, StoreError>;

    /// Counters; `topics_today` counts topics created at or after `day_start`.
    async fn stats(&self, day_start: DateTime<Utc>) -> Result<ForumStats, StoreError>;
}
