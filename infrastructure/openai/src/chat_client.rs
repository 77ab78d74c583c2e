use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use business::domain::chat::errors::ChatError;
use business::domain::chat::model::{
    ChatCompletion, ChatMessage, ChatOptions, ChatRole, FinishReason, FunctionCall,
    FunctionDeclaration, TokenUsage,
};
use business::domain::chat::services::ChatClient;

use crate::client::AzureOpenAIClient;

#[derive(Debug, Serialize)]
struct WireRequest {
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments, as sent by the service.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDefinition,
}

#[derive(Debug, Serialize)]
struct WireFunctionDefinition {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// [`ChatClient`] backed by an Azure OpenAI chat completions deployment.
pub struct AzureOpenAIChatClient {
    client: AzureOpenAIClient,
}

impl AzureOpenAIChatClient {
    pub fn new(client: AzureOpenAIClient) -> Self {
        Self { client }
    }

    fn build_request(messages: &[ChatMessage], options: &ChatOptions) -> WireRequest {
        WireRequest {
            messages: messages.iter().map(to_wire_message).collect(),
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
            tools: options.functions.iter().map(to_wire_tool).collect(),
        }
    }

    fn parse_response(response: WireResponse) -> Result<ChatCompletion, ChatError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::InvalidResponse("no choices returned".to_string()))?;

        let role = choice
            .message
            .role
            .parse::<ChatRole>()
            .map_err(ChatError::InvalidResponse)?;

        let function_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| FunctionCall {
                id: call.id,
                name: call.function.name,
                // Malformed arguments are handed to the function as a raw string so
                // the failure surfaces through the invocation layer.
                arguments: serde_json::from_str(&call.function.arguments)
                    .unwrap_or(serde_json::Value::String(call.function.arguments)),
            })
            .collect();

        Ok(ChatCompletion {
            message: ChatMessage {
                role,
                content: choice.message.content,
                function_calls,
                function_call_id: None,
            },
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

fn to_wire_message(message: &ChatMessage) -> WireMessage {
    WireMessage {
        role: message.role.to_string(),
        content: message.content.clone(),
        tool_calls: message
            .function_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                kind: "function".to_string(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.function_call_id.clone(),
    }
}

fn to_wire_tool(declaration: &FunctionDeclaration) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunctionDefinition {
            name: declaration.name.clone(),
            description: declaration.description.clone(),
            parameters: declaration.parameters.clone(),
        },
    }
}

#[async_trait]
impl ChatClient for AzureOpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatCompletion, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        let body = Self::build_request(messages, options);

        let response = self
            .client
            .client
            .post(self.client.chat_completions_url())
            .header("api-key", self.client.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let data: WireResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        Self::parse_response(data)
    }
}
