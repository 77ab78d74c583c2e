use async_trait::async_trait;

use crate::domain::chat::errors::ChatError;
use crate::domain::chat::model::ChatMessage;

pub struct SendChatMessageParams {
    /// Conversation so far, oldest first. The last message must come from the user.
    pub messages: Vec<ChatMessage>,
}

#[async_trait]
pub trait SendChatMessageUseCase: Send + Sync {
    async fn execute(&self, params: SendChatMessageParams) -> Result<ChatMessage, ChatError>;
}
