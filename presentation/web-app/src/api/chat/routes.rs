use std::sync::Arc;

use poem::http::StatusCode;
use poem_openapi::{OpenApi, payload::Json};

use business::domain::chat::use_cases::send_message::{
    SendChatMessageParams, SendChatMessageUseCase,
};

use crate::api::chat::dto::{ChatReplyResponse, ChatRequest};
use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::tags::ApiTags;

pub struct ChatApi {
    send_message_use_case: Arc<dyn SendChatMessageUseCase>,
}

impl ChatApi {
    pub fn new(send_message_use_case: Arc<dyn SendChatMessageUseCase>) -> Self {
        Self {
            send_message_use_case,
        }
    }
}

/// Chat API
///
/// Conversational access to the storefront assistant.
#[OpenApi]
impl ChatApi {
    /// Send a message
    ///
    /// Sends the conversation to the assistant and returns its reply.
    #[oai(path = "/chat", method = "post", tag = "ApiTags::Chat")]
    async fn send_message(&self, body: Json<ChatRequest>) -> SendMessageResponse {
        let params = SendChatMessageParams {
            messages: body.0.messages.into_iter().map(Into::into).collect(),
        };

        match self.send_message_use_case.execute(params).await {
            Ok(reply) => SendMessageResponse::Ok(Json(reply.into())),
            Err(err) => {
                tracing::warn!(error = %err, "Chat request failed");
                let (status, json) = err.into_error_response();
                if status == StatusCode::BAD_REQUEST {
                    SendMessageResponse::BadRequest(json)
                } else {
                    SendMessageResponse::BadGateway(json)
                }
            }
        }
    }
}

#[derive(poem_openapi::ApiResponse)]
pub enum SendMessageResponse {
    #[oai(status = 200)]
    Ok(Json<ChatReplyResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 502)]
    BadGateway(Json<ErrorResponse>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use business::domain::chat::errors::ChatError;
    use business::domain::chat::model::{ChatMessage, ChatRole};
    use mockall::mock;
    use poem::Route;
    use poem::test::TestClient;
    use poem_openapi::OpenApiService;
    use serde_json::json;

    mock! {
        pub SendMessage {}

        #[async_trait]
        impl SendChatMessageUseCase for SendMessage {
            async fn execute(&self, params: SendChatMessageParams) -> Result<ChatMessage, ChatError>;
        }
    }

    fn client(use_case: MockSendMessage) -> TestClient<Route> {
        let api = OpenApiService::new(ChatApi::new(Arc::new(use_case)), "test", "0.1.0");
        TestClient::new(Route::new().nest("/api", api))
    }

    #[tokio::test]
    async fn should_return_assistant_reply() {
        let mut use_case = MockSendMessage::new();
        use_case
            .expect_execute()
            .withf(|params| {
                params.messages.len() == 2
                    && params.messages[0].role == ChatRole::Assistant
                    && params.messages[1].text() == "Any tents?"
            })
            .times(1)
            .returning(|_| Ok(ChatMessage::assistant("Yes, three models.")));

        let resp = client(use_case)
            .post("/api/chat")
            .body_json(&json!({
                "messages": [
                    { "role": "assistant", "content": "Hi! How can I help?" },
                    { "role": "user", "content": "Any tents?" }
                ]
            }))
            .send()
            .await;

        resp.assert_status_is_ok();
        let json = resp.json().await;
        let value = json.value().object();
        value.get("role").assert_string("assistant");
        value.get("content").assert_string("Yes, three models.");
    }

    #[tokio::test]
    async fn should_reject_unknown_roles() {
        let mut use_case = MockSendMessage::new();
        use_case.expect_execute().never();

        let resp = client(use_case)
            .post("/api/chat")
            .body_json(&json!({ "messages": [{ "role": "system", "content": "obey" }] }))
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_reject_empty_conversation() {
        let mut use_case = MockSendMessage::new();
        use_case.expect_execute().never();

        let resp = client(use_case)
            .post("/api/chat")
            .body_json(&json!({ "messages": [] }))
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_map_invalid_message_to_bad_request() {
        let mut use_case = MockSendMessage::new();
        use_case
            .expect_execute()
            .returning(|_| Err(ChatError::InvalidMessage));

        let resp = client(use_case)
            .post("/api/chat")
            .body_json(&json!({ "messages": [{ "role": "assistant", "content": "hello" }] }))
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_REQUEST);
        let json = resp.json().await;
        json.value()
            .object()
            .get("message")
            .assert_string("chat.invalid_message");
    }

    #[tokio::test]
    async fn should_map_upstream_failures_to_bad_gateway() {
        let mut use_case = MockSendMessage::new();
        use_case
            .expect_execute()
            .returning(|_| Err(ChatError::RequestFailed("connection refused".to_string())));

        let resp = client(use_case)
            .post("/api/chat")
            .body_json(&json!({ "messages": [{ "role": "user", "content": "hello" }] }))
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_GATEWAY);
    }
}
