use std::sync::Arc;

use poem::http::StatusCode;
use poem::web::{Data, Form, Html};
use poem::{IntoResponse, Response, Result, handler};
use serde::Deserialize;
use uuid::Uuid;

use business::domain::chat::errors::ChatError;
use business::domain::chat::model::ChatMessage;
use business::domain::chat::use_cases::send_message::{
    SendChatMessageParams, SendChatMessageUseCase,
};

use crate::api::pages::templates;
use crate::middleware::antiforgery::AntiforgeryToken;

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

#[handler]
pub fn home(Data(token): Data<&AntiforgeryToken>) -> Html<String> {
    Html(templates::home_page(token))
}

#[handler]
pub async fn send_chat(
    Data(use_case): Data<&Arc<dyn SendChatMessageUseCase>>,
    Data(token): Data<&AntiforgeryToken>,
    Form(form): Form<ChatForm>,
) -> Result<Response> {
    let question = form.message.trim().to_string();
    let params = SendChatMessageParams {
        messages: vec![ChatMessage::user(question.clone())],
    };

    match use_case.execute(params).await {
        Ok(reply) => Ok(Html(templates::chat_page(token, &question, Some(reply.text()))).into_response()),
        Err(ChatError::EmptyConversation | ChatError::InvalidMessage) => Ok(Html(
            templates::chat_page(token, &question, None),
        )
        .with_status(StatusCode::BAD_REQUEST)
        .into_response()),
        Err(err) => Err(poem::Error::from_string(
            err.to_string(),
            StatusCode::BAD_GATEWAY,
        )),
    }
}

#[handler]
pub fn error_page() -> Html<String> {
    let request_id = Uuid::new_v4().to_string();
    Html(templates::error_page(&request_id))
}
