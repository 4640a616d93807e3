use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Reply {
    pub id: i64,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "autor")]
    pub author_id: i64,
    #[serde(rename = "topico")]
    pub topic_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub message: String,
    pub author_id: i64,
    pub topic_id: i64,
}
