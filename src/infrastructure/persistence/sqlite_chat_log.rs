use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::application::ports::outbound::{ChatLogError, ChatLogPort};
use crate::domain::entities::{ChatFlags, ChatMessage};
use crate::domain::value_objects::{ActorId, ChatMessageId};

type ChatRow = (String, String, String, String, String, DateTime<Utc>);

/// Chat log stored in SQLite; content and flags are JSON columns
pub struct SqliteChatLog {
    pool: SqlitePool,
}

impl SqliteChatLog {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                speaker TEXT NOT NULL,
                template TEXT NOT NULL,
                content TEXT NOT NULL,
                flags TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ChatLogError> {
    serde_json::to_string(value).map_err(|e| ChatLogError::Serialization(e.to_string()))
}

fn from_row(row: ChatRow) -> Result<ChatMessage, ChatLogError> {
    let (id, speaker, template, content, flags, created_at) = row;
    let id: ChatMessageId = id
        .parse()
        .map_err(|e: uuid::Error| ChatLogError::Serialization(e.to_string()))?;
    let speaker: ActorId = speaker
        .parse()
        .map_err(|e: uuid::Error| ChatLogError::Serialization(e.to_string()))?;
    Ok(ChatMessage {
        id,
        speaker,
        template,
        content: serde_json::from_str(&content)
            .map_err(|e| ChatLogError::Serialization(e.to_string()))?,
        flags: serde_json::from_str::<ChatFlags>(&flags)
            .map_err(|e| ChatLogError::Serialization(e.to_string()))?,
        created_at,
    })
}

#[async_trait]
impl ChatLogPort for SqliteChatLog {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessageId, ChatLogError> {
        sqlx::query(
            "INSERT INTO chat_messages (id, speaker, template, content, flags, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.speaker.to_string())
        .bind(&message.template)
        .bind(to_json(&message.content)?)
        .bind(to_json(&message.flags)?)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatLogError::Database(e.to_string()))?;

        Ok(message.id)
    }

    async fn get(&self, id: ChatMessageId) -> Result<Option<ChatMessage>, ChatLogError> {
        let row: Option<ChatRow> = sqlx::query_as(
            "SELECT id, speaker, template, content, flags, created_at \
             FROM chat_messages WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatLogError::Database(e.to_string()))?;

        row.map(from_row).transpose()
    }

    async fn mark_target_applied(
        &self,
        id: ChatMessageId,
        key: &str,
    ) -> Result<bool, ChatLogError> {
        let path = ledger_path(key)?;
        // Only the one ledger entry is rewritten, and only while it is still unapplied
        let result = sqlx::query(
            r#"
            UPDATE chat_messages
            SET flags = json_set(flags, ?, json('true'))
            WHERE id = ?
              AND json_type(flags, '$.damage_data') = 'object'
              AND coalesce(json_extract(flags, ?), 0) = 0
        "#,
        )
        .bind(&path)
        .bind(id.to_string())
        .bind(&path)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatLogError::Database(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.get(id).await? {
            None => Err(ChatLogError::NotFound(id)),
            Some(message) if message.flags.damage_data.is_none() => {
                Err(ChatLogError::NoDamageData(id))
            }
            Some(_) => Ok(false),
        }
    }
}

fn ledger_path(key: &str) -> Result<String, ChatLogError> {
    if key.contains('"') {
        return Err(ChatLogError::Serialization(format!(
            "Ledger key cannot contain quotes: {key}"
        )));
    }
    Ok(format!("$.damage_data.targets_applied.\"{key}\""))
}
