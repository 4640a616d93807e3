//! Store contract, run against the memory store and, when `DATABASE_URL` is
//! set (directly or through `.env`), against PostgreSQL too.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{Duration, Utc};

use forumhub_api::config::AppConfig;
use forumhub_api::database::models::{NewReply, NewTopic, NewUser, TopicStatus, TopicUpdate, User};
use forumhub_api::database::{CredentialStore, MemoryStore, PgStore, StoreError};

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Email unique across runs, since the PostgreSQL database outlives the test process.
fn unique_email(prefix: &str) -> String {
    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{}-{}@forum.dev", prefix, stamp, SEQ.fetch_add(1, Ordering::Relaxed))
}

async fn postgres() -> Result<Option<PgStore>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL store checks");
        return Ok(None);
    };

    let store = PgStore::connect(&url, &AppConfig::for_memory("unused").database).await?;
    store.migrate().await?;
    Ok(Some(store))
}

/// Runs `check` on the memory store, then on PostgreSQL when available.
macro_rules! on_every_store {
    ($check:ident) => {{
        $check(&MemoryStore::new()).await?;
        if let Some(pg) = postgres().await? {
            $check(&pg).await?;
            pg.close().await;
        }
        Ok(())
    }};
}

async fn user(store: &dyn CredentialStore, prefix: &str) -> Result<User> {
    Ok(store
        .create_user(NewUser {
            name: prefix.to_string(),
            email: unique_email(prefix),
            password_hash: "$argon2id$not-checked-here".to_string(),
        })
        .await?)
}

fn topic_by(author_id: i64) -> NewTopic {
    NewTopic {
        title: "Ownership".to_string(),
        message: "Quem é o dono?".to_string(),
        course: "Rust".to_string(),
        author_id,
    }
}

fn reply_to(topic_id: i64, author_id: i64) -> NewReply {
    NewReply {
        message: "O escopo".to_string(),
        author_id,
        topic_id,
    }
}

async fn duplicate_email(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    let again = store
        .create_user(NewUser {
            name: "Outra Ana".to_string(),
            email: ana.email.clone(),
            password_hash: ana.password_hash.clone(),
        })
        .await;
    assert!(matches!(again, Err(StoreError::Conflict(_))), "got {:?}", again);

    let found = store.find_user_by_email(&ana.email).await?.expect("user is stored");
    assert_eq!(found.id, ana.id);
    assert_eq!(found.name, "ana");
    assert_eq!(found.password_hash, ana.password_hash);
    Ok(())
}

async fn topic_columns_round_trip(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    let created = store.create_topic(topic_by(ana.id)).await?;
    assert_eq!(created.status, TopicStatus::NotAnswered);
    assert_eq!(created.author_id, ana.id);

    let fetched = store.find_topic(created.id).await?.expect("topic is stored");
    assert_eq!(fetched, created);

    let updated = store
        .update_topic(
            created.id,
            TopicUpdate {
                title: "Borrowing".to_string(),
                message: "E o empréstimo?".to_string(),
            },
        )
        .await?
        .expect("topic exists");
    assert_eq!(updated.title, "Borrowing");
    assert_eq!(updated.course, "Rust");
    assert_eq!(updated.created_at, created.created_at);

    let missing = TopicUpdate {
        title: "t".to_string(),
        message: "m".to_string(),
    };
    assert!(store.update_topic(i64::MAX, missing).await?.is_none());
    Ok(())
}

async fn reply_to_missing_topic(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    let result = store.create_reply(reply_to(i64::MAX, ana.id)).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))), "got {:?}", result);
    Ok(())
}

async fn reply_marks_topic_answered(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    let bob = user(store, "bob").await?;
    let topic = store.create_topic(topic_by(ana.id)).await?;

    let reply = store.create_reply(reply_to(topic.id, bob.id)).await?;
    assert_eq!(reply.topic_id, topic.id);
    assert_eq!(reply.author_id, bob.id);

    let topic = store.find_topic(topic.id).await?.expect("topic exists");
    assert_eq!(topic.status, TopicStatus::Answered);
    assert_eq!(store.list_replies(topic.id).await?, vec![reply]);
    Ok(())
}

async fn delete_topic_cascades(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    let topic = store.create_topic(topic_by(ana.id)).await?;
    store.create_reply(reply_to(topic.id, ana.id)).await?;

    assert!(store.delete_topic(topic.id).await?);
    assert!(!store.delete_topic(topic.id).await?);
    assert!(store.find_topic(topic.id).await?.is_none());
    assert!(store.list_replies(topic.id).await?.is_empty());

    // Nothing references the author any more.
    assert!(store.delete_user(ana.id).await?);
    Ok(())
}

async fn author_cannot_be_deleted(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    store.create_topic(topic_by(ana.id)).await?;

    let result = store.delete_user(ana.id).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))), "got {:?}", result);
    assert!(store.find_user_by_id(ana.id).await?.is_some());

    let bob = user(store, "bob").await?;
    assert!(store.delete_user(bob.id).await?);
    assert!(!store.delete_user(bob.id).await?);
    Ok(())
}

async fn stats_count_rows(store: &dyn CredentialStore) -> Result<()> {
    let ana = user(store, "ana").await?;
    let topic = store.create_topic(topic_by(ana.id)).await?;
    store.create_reply(reply_to(topic.id, ana.id)).await?;

    let stats = store.stats(topic.created_at).await?;
    assert!(stats.total_topics >= 1);
    assert!(stats.total_users >= 1);
    assert!(stats.topics_today >= 1);
    assert!(stats.total_replies >= 1);

    let future = store.stats(Utc::now() + Duration::hours(1)).await?;
    assert_eq!(future.topics_today, 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    on_every_store!(duplicate_email)
}

#[tokio::test]
async fn topic_fields_survive_storage() -> Result<()> {
    on_every_store!(topic_columns_round_trip)
}

#[tokio::test]
async fn reply_to_missing_topic_is_not_found() -> Result<()> {
    on_every_store!(reply_to_missing_topic)
}

#[tokio::test]
async fn reply_flips_topic_to_answered() -> Result<()> {
    on_every_store!(reply_marks_topic_answered)
}

#[tokio::test]
async fn deleting_topic_removes_its_replies() -> Result<()> {
    on_every_store!(delete_topic_cascades)
}

#[tokio::test]
async fn topic_author_cannot_be_deleted() -> Result<()> {
    on_every_store!(author_cannot_be_deleted)
}

#[tokio::test]
async fn stats_reflect_stored_rows() -> Result<()> {
    on_every_store!(stats_count_rows)
}
