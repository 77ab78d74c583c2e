use async_trait::async_trait;

use super::errors::ChatError;
use super::model::{ChatCompletion, ChatMessage, ChatOptions, FunctionDeclaration};

/// Service port for submitting a conversation to a hosted language model.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatCompletion, ChatError>;
}

/// A function the model can ask the application to run.
#[async_trait]
pub trait ChatFunction: Send + Sync {
    fn declaration(&self) -> FunctionDeclaration;

    async fn invoke(&self, arguments: &serde_json::Value) -> Result<serde_json::Value, ChatError>;
}
