use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{ChatLogError, ChatLogPort};
use crate::domain::entities::ChatMessage;
use crate::domain::value_objects::ChatMessageId;

/// Chat log held in process memory
#[derive(Default)]
pub struct InMemoryChatLog {
    messages: RwLock<HashMap<ChatMessageId, ChatMessage>>,
}

impl InMemoryChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl ChatLogPort for InMemoryChatLog {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessageId, ChatLogError> {
        let id = message.id;
        self.messages.write().await.insert(id, message);
        Ok(id)
    }

    async fn get(&self, id: ChatMessageId) -> Result<Option<ChatMessage>, ChatLogError> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn mark_target_applied(
        &self,
        id: ChatMessageId,
        key: &str,
    ) -> Result<bool, ChatLogError> {
        let mut messages = self.messages.write().await;
        let message = messages.get_mut(&id).ok_or(ChatLogError::NotFound(id))?;
        let flag = message
            .flags
            .damage_data
            .as_mut()
            .ok_or(ChatLogError::NoDamageData(id))?;
        if flag.is_applied(key) {
            return Ok(false);
        }
        flag.mark_applied(key);
        Ok(true)
    }
}
