use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::{
    ForumStats, NewReply, NewTopic, NewUser, Reply, Topic, TopicStatus, TopicUpdate, User,
};
use crate::database::store::{CredentialStore, StoreError};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Idempotent schema. Replies cascade with their topic; users are restricted.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS usuarios (
        id            BIGSERIAL PRIMARY KEY,
        nome          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        senha         TEXT NOT NULL,
        data_criacao  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS topicos (
        id            BIGSERIAL PRIMARY KEY,
        titulo        TEXT NOT NULL,
        mensagem      TEXT NOT NULL,
        data_criacao  TIMESTAMPTZ NOT NULL DEFAULT now(),
        status        TEXT NOT NULL DEFAULT 'NAO_RESPONDIDO',
        autor_id      BIGINT NOT NULL REFERENCES usuarios(id) ON DELETE RESTRICT,
        curso         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS respostas (
        id            BIGSERIAL PRIMARY KEY,
        mensagem      TEXT NOT NULL,
        data_criacao  TIMESTAMPTZ NOT NULL DEFAULT now(),
        autor_id      BIGINT NOT NULL REFERENCES usuarios(id) ON DELETE RESTRICT,
        topico_id     BIGINT NOT NULL REFERENCES topicos(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS respostas_topico_idx ON respostas (topico_id)",
];

const USER_COLUMNS: &str = "id, nome AS name, email, senha AS password_hash, data_criacao AS created_at";
const TOPIC_COLUMNS: &str = "id, titulo AS title, mensagem AS message, data_criacao AS created_at, \
                             status, autor_id AS author_id, curso AS course";
const REPLY_COLUMNS: &str = "id, mensagem AS message, data_criacao AS created_at, \
                             autor_id AS author_id, topico_id AS topic_id";

/// Row shape for `topicos`; status is stored as text.
#[derive(FromRow)]
struct TopicRow {
    id: i64,
    title: String,
    message: String,
    created_at: DateTime<Utc>,
    status: String,
    author_id: i64,
    course: String,
}

impl TryFrom<TopicRow> for Topic {
    type Error = StoreError;

    fn try_from(row: TopicRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TopicStatus>().map_err(StoreError::Corrupt)?;
        Ok(Topic {
            id: row.id,
            title: row.title,
            message: row.message,
            created_at: row.created_at,
            status,
            author_id: row.author_id,
            course: row.course,
        })
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Apply the schema. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Translate constraint violations into store-level errors.
fn classify(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::Conflict(format!("{} already exists", what)),
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::NotFound(format!("{} references a missing record", what))
            }
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO usuarios (nome, email, senha) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, &format!("user with email '{}'", user.email)))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM usuarios WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM usuarios WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match classify(e, "user") {
                StoreError::NotFound(_) => {
                    StoreError::Conflict(format!("user {} still authors topics or replies", id))
                }
                other => other,
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let sql = format!("SELECT {} FROM topicos ORDER BY data_criacao, id", TOPIC_COLUMNS);
        sqlx::query_as::<_, TopicRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Topic::try_from)
            .collect()
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        let sql = format!(
            "INSERT INTO topicos (titulo, mensagem, curso, autor_id, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TOPIC_COLUMNS
        );
        sqlx::query_as::<_, TopicRow>(&sql)
            .bind(&topic.title)
            .bind(&topic.message)
            .bind(&topic.course)
            .bind(topic.author_id)
            .bind(TopicStatus::NotAnswered.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "topic"))?
            .try_into()
    }

    async fn find_topic(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        let sql = format!("SELECT {} FROM topicos WHERE id = $1", TOPIC_COLUMNS);
        sqlx::query_as::<_, TopicRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Topic::try_from)
            .transpose()
    }

    async fn update_topic(&self, id: i64, update: TopicUpdate) -> Result<Option<Topic>, StoreError> {
        let sql = format!(
            "UPDATE topicos SET titulo = $2, mensagem = $3 WHERE id = $1 RETURNING {}",
            TOPIC_COLUMNS
        );
        sqlx::query_as::<_, TopicRow>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(&update.message)
            .fetch_optional(&self.pool)
            .await?
            .map(Topic::try_from)
            .transpose()
    }

    async fn delete_topic(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM topicos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_replies(&self, topic_id: i64) -> Result<Vec<Reply>, StoreError> {
        let sql = format!(
            "SELECT {} FROM respostas WHERE topico_id = $1 ORDER BY data_criacao, id",
            REPLY_COLUMNS
        );
        let replies = sqlx::query_as::<_, Reply>(&sql)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(replies)
    }

    async fn create_reply(&self, reply: NewReply) -> Result<Reply, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO respostas (mensagem, autor_id, topico_id) VALUES ($1, $2, $3) RETURNING {}",
            REPLY_COLUMNS
        );
        let created = sqlx::query_as::<_, Reply>(&sql)
            .bind(&reply.message)
            .bind(reply.author_id)
            .bind(reply.topic_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(e, &format!("reply to topic {}", reply.topic_id)))?;

        sqlx::query("UPDATE topicos SET status = $2 WHERE id = $1")
            .bind(reply.topic_id)
            .bind(TopicStatus::Answered.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn stats(&self, day_start: DateTime<Utc>) -> Result<ForumStats, StoreError> {
        let (total_topics, total_users, topics_today, total_replies): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM topicos),
                (SELECT COUNT(*) FROM usuarios),
                (SELECT COUNT(*) FROM topicos WHERE data_criacao >= $1),
                (SELECT COUNT(*) FROM respostas)",
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(ForumStats {
            total_topics,
            total_users,
            topics_today,
            total_replies,
        })
    }
}
