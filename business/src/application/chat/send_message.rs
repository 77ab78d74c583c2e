use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::chat::errors::ChatError;
use crate::domain::chat::model::{ChatMessage, ChatOptions, ChatRole};
use crate::domain::chat::services::ChatClient;
use crate::domain::chat::use_cases::send_message::{SendChatMessageParams, SendChatMessageUseCase};
use crate::domain::logger::Logger;

pub const SYSTEM_PROMPT: &str = r#"You are a friendly shopping assistant for an online outdoor-gear store.
Answer questions about products in the catalog briefly and politely.
When the customer asks to see a product, call get_product_image_url with its catalog id
and include the returned link in your answer.
Never invent prices, stock levels or order details you were not given."#;

pub struct SendChatMessageUseCaseImpl {
    pub client: Arc<dyn ChatClient>,
    pub logger: Arc<dyn Logger>,
    pub options: ChatOptions,
}

#[async_trait]
impl SendChatMessageUseCase for SendChatMessageUseCaseImpl {
    async fn execute(&self, params: SendChatMessageParams) -> Result<ChatMessage, ChatError> {
        let Some(last) = params.messages.last() else {
            return Err(ChatError::EmptyConversation);
        };
        if last.role != ChatRole::User || last.text().trim().is_empty() {
            return Err(ChatError::InvalidMessage);
        }
        if params
            .messages
            .iter()
            .any(|m| matches!(m.role, ChatRole::System | ChatRole::Tool))
        {
            return Err(ChatError::InvalidMessage);
        }

        self.logger.info(&format!(
            "Sending chat conversation with {} messages",
            params.messages.len()
        ));

        let mut conversation = Vec::with_capacity(params.messages.len() + 1);
        conversation.push(ChatMessage::system(SYSTEM_PROMPT));
        conversation.extend(params.messages);

        let completion = self.client.complete(&conversation, &self.options).await?;

        if let Some(usage) = completion.usage {
            self.logger.debug(&format!(
                "Chat completion used {} input and {} output tokens",
                usage.input_tokens, usage.output_tokens
            ));
        }

        Ok(completion.message)
    }
}
