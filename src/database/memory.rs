use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::models::{
    ForumStats, NewReply, NewTopic, NewUser, Reply, Topic, TopicStatus, TopicUpdate, User,
};
use crate::database::store::{CredentialStore, StoreError};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    topics: BTreeMap<i64, Topic>,
    replies: BTreeMap<i64, Reply>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_user(&self, id: i64) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("user {} does not exist", id)))
        }
    }
}

/// In-process store with the same constraints as the PostgreSQL schema.
///
/// Backs tests and `serve --memory`. Ids are allocated from one sequence,
/// so BTreeMap order is insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email '{}' is already registered", user.email)));
        }

        let id = tables.allocate_id();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        debug!("memory store: created user {}", id);
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let referenced = tables.topics.values().any(|t| t.author_id == id)
            || tables.replies.values().any(|r| r.author_id == id);
        if referenced {
            return Err(StoreError::Conflict(format!("user {} still authors topics or replies", id)));
        }
        Ok(tables.users.remove(&id).is_some())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        Ok(self.tables.read().await.topics.values().cloned().collect())
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(topic.author_id)?;

        let id = tables.allocate_id();
        let topic = Topic {
            id,
            title: topic.title,
            message: topic.message,
            created_at: Utc::now(),
            status: TopicStatus::NotAnswered,
            author_id: topic.author_id,
            course: topic.course,
        };
        tables.topics.insert(id, topic.clone());
        Ok(topic)
    }

    async fn find_topic(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        Ok(self.tables.read().await.topics.get(&id).cloned())
    }

    async fn update_topic(&self, id: i64, update: TopicUpdate) -> Result<Option<Topic>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.topics.get_mut(&id).map(|topic| {
            topic.title = update.title;
            topic.message = update.message;
            topic.clone()
        }))
    }

    async fn delete_topic(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.topics.remove(&id).is_none() {
            return Ok(false);
        }
        tables.replies.retain(|_, reply| reply.topic_id != id);
        Ok(true)
    }

    async fn list_replies(&self, topic_id: i64) -> Result<Vec<Reply>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .replies
            .values()
            .filter(|r| r.topic_id == topic_id)
            .cloned()
            .collect())
    }

    async fn create_reply(&self, reply: NewReply) -> Result<Reply, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(reply.author_id)?;
        if !tables.topics.contains_key(&reply.topic_id) {
            return Err(StoreError::NotFound(format!("topic {} does not exist", reply.topic_id)));
        }

        let id = tables.allocate_id();
        let reply = Reply {
            id,
            message: reply.message,
            created_at: Utc::now(),
            author_id: reply.author_id,
            topic_id: reply.topic_id,
        };
        tables.replies.insert(id, reply.clone());
        if let Some(topic) = tables.topics.get_mut(&reply.topic_id) {
            topic.status = TopicStatus::Answered;
        }
        Ok(reply)
    }

    async fn stats(&self, day_start: DateTime<Utc>) -> Result<ForumStats, StoreError> {
        let tables = self.tables.read().await;
        Ok(ForumStats {
            total_topics: tables.topics.len() as i64,
            total_users: tables.users.len() as i64,
            topics_today: tables.topics.values().filter(|t| t.created_at >= day_start).count() as i64,
            total_replies: tables.replies.len() as i64,
        })
    }
}
