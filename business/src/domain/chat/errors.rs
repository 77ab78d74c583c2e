#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat.empty_conversation")]
    EmptyConversation,
    #[error("chat.invalid_message")]
    InvalidMessage,
    #[error("chat.request_failed: {0}")]
    RequestFailed(String),
    #[error("chat.upstream_status: {status}")]
    UpstreamStatus { status: u16, body: String },
    #[error("chat.invalid_response: {0}")]
    InvalidResponse(String),
    #[error("chat.function_failed: {0}")]
    FunctionFailed(String),
    #[error("chat.client_unavailable: {0}")]
    ClientUnavailable(String),
}
