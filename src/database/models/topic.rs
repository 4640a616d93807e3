use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TopicStatus {
    #[serde(rename = "NAO_RESPONDIDO")]
    NotAnswered,
    #[serde(rename = "RESPONDIDO")]
    Answered,
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicStatus::NotAnswered => "NAO_RESPONDIDO",
            TopicStatus::Answered => "RESPONDIDO",
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NAO_RESPONDIDO" => Ok(TopicStatus::NotAnswered),
            "RESPONDIDO" => Ok(TopicStatus::Answered),
            other => Err(format!("unknown topic status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    pub status: TopicStatus,
    #[serde(rename = "autor")]
    pub author_id: i64,
    #[serde(rename = "curso")]
    pub course: String,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub title: String,
    pub message: String,
    pub course: String,
    pub author_id: i64,
}

/// Fields a topic update overwrites. The course stays as created.
#[derive(Debug, Clone)]
pub struct TopicUpdate {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForumStats {
    #[serde(rename = "totalTopicos")]
    pub total_topics: i64,
    #[serde(rename = "totalUsuarios")]
    pub total_users: i64,
    #[serde(rename = "topicosHoje")]
    pub topics_today: i64,
    #[serde(rename = "totalRespostas")]
    pub total_replies: i64,
}
