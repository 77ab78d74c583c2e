use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::logger::Logger;

use super::errors::ChatError;
use super::model::{ChatCompletion, ChatMessage, ChatOptions, FunctionCall};
use super::services::{ChatClient, ChatFunction};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Decorates a [`ChatClient`] so that function calls requested by the model
/// are executed locally and their results fed back until the model answers.
pub struct FunctionInvokingChatClient {
    inner: Arc<dyn ChatClient>,
    functions: Vec<Arc<dyn ChatFunction>>,
    max_iterations: usize,
    logger: Arc<dyn Logger>,
}

impl FunctionInvokingChatClient {
    pub fn new(inner: Arc<dyn ChatClient>, logger: Arc<dyn Logger>) -> Self {
        Self {
            inner,
            functions: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            logger,
        }
    }

    pub fn with_function(mut self, function: Arc<dyn ChatFunction>) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn advertise(&self, options: &ChatOptions) -> ChatOptions {
        let mut options = options.clone();
        for function in &self.functions {
            let declaration = function.declaration();
            if !options.functions.iter().any(|f| f.name == declaration.name) {
                options.functions.push(declaration);
            }
        }
        options
    }

    async fn invoke(&self, call: &FunctionCall) -> String {
        let Some(function) = self
            .functions
            .iter()
            .find(|f| f.declaration().name == call.name)
        else {
            self.logger
                .warn(&format!("Model requested unknown function: {}", call.name));
            return format!("Error: Requested function \"{}\" not found.", call.name);
        };

        self.logger.debug(&format!("Invoking function: {}", call.name));

        match function.invoke(&call.arguments).await {
            Ok(value) => value.to_string(),
            Err(err) => {
                self.logger
                    .error(&format!("Function {} failed: {}", call.name, err));
                "Error: Function failed.".to_string()
            }
        }
    }
}

#[async_trait]
impl ChatClient for FunctionInvokingChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatCompletion, ChatError> {
        let mut history = messages.to_vec();
        let mut options = self.advertise(options);

        for _ in 0..self.max_iterations {
            let completion = self.inner.complete(&history, &options).await?;
            if !completion.requests_function_calls() {
                return Ok(completion);
            }

            let calls = completion.message.function_calls.clone();
            history.push(completion.message);
            for call in &calls {
                let result = self.invoke(call).await;
                history.push(ChatMessage::function_result(call.id.clone(), result));
            }
        }

        self.logger.warn(&format!(
            "Function invocation limit of {} reached, requesting final answer",
            self.max_iterations
        ));
        options.functions.clear();
        self.inner.complete(&history, &options).await
    }
}
