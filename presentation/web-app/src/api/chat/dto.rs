use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

use business::domain::chat::model::{ChatMessage, ChatRole};

/// Roles a caller may use. The system prompt is fixed server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
pub enum ChatRoleDto {
    #[oai(rename = "user")]
    User,
    #[oai(rename = "assistant")]
    Assistant,
}

impl From<ChatRoleDto> for ChatRole {
    fn from(role: ChatRoleDto) -> Self {
        match role {
            ChatRoleDto::User => ChatRole::User,
            ChatRoleDto::Assistant => ChatRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ChatMessageDto {
    /// Author of the message
    pub role: ChatRoleDto,
    /// Message text
    #[oai(validator(max_length = 4000))]
    pub content: String,
}

impl From<ChatMessageDto> for ChatMessage {
    fn from(dto: ChatMessageDto) -> Self {
        ChatMessage::new(dto.role.into(), dto.content)
    }
}

#[derive(Debug, Clone, Object)]
pub struct ChatRequest {
    /// Conversation so far, oldest first; the last message must come from the user
    #[oai(validator(min_items = 1, max_items = 50))]
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, Object)]
pub struct ChatReplyResponse {
    /// Always `assistant`
    pub role: String,
    /// Reply text
    pub content: String,
}

impl From<ChatMessage> for ChatReplyResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: message.role.to_string(),
            content: message.text().to_string(),
        }
    }
}
