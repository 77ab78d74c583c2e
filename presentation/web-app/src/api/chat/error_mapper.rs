use poem::http::StatusCode;
use poem_openapi::payload::Json;

use business::domain::chat::errors::ChatError;

use crate::api::error::{ErrorResponse, IntoErrorResponse};

impl IntoErrorResponse for ChatError {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>) {
        let (status, name, message) = match &self {
            ChatError::EmptyConversation => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "chat.empty_conversation",
            ),
            ChatError::InvalidMessage => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "chat.invalid_message",
            ),
            ChatError::RequestFailed(_)
            | ChatError::UpstreamStatus { .. }
            | ChatError::InvalidResponse(_) => {
                (StatusCode::BAD_GATEWAY, "UpstreamError", "chat.upstream_failed")
            }
            ChatError::FunctionFailed(_) | ChatError::ClientUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                "UpstreamError",
                "chat.unavailable",
            ),
        };

        (status, ErrorResponse::json(name, message))
    }
}
