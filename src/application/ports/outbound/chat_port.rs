use async_trait::async_trait;

use crate::domain::entities::ChatMessage;
use crate::domain::value_objects::ChatMessageId;

#[derive(Debug, thiserror::Error)]
pub enum ChatLogError {
    #[error("Chat message not found: {0}")]
    NotFound(ChatMessageId),
    #[error("Chat message {0} carries no damage data")]
    NoDamageData(ChatMessageId),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence for rendered chat cards and their flags
///
/// The stored message is the source of truth for the damage ledger; it may be
/// read and written from a different process than the one that created it.
#[async_trait]
pub trait ChatLogPort: Send + Sync {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessageId, ChatLogError>;

    async fn get(&self, id: ChatMessageId) -> Result<Option<ChatMessage>, ChatLogError>;

    /// Flip one target's ledger entry to applied, leaving every other entry as stored.
    ///
    /// Returns false when the entry was already applied.
    async fn mark_target_applied(&self, id: ChatMessageId, key: &str) -> Result<bool, ChatLogError>;
}
