use poem::http::StatusCode;
use poem_openapi::{Object, payload::Json};

/// JSON body of every API error.
#[derive(Object, Debug)]
pub struct ErrorResponse {
    /// Error category, e.g. `ValidationError`
    pub name: String,
    /// Code-style message, e.g. `chat.invalid_message`
    pub message: String,
}

impl ErrorResponse {
    pub fn json(name: &str, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            name: name.to_string(),
            message: message.into(),
        })
    }
}

pub trait IntoErrorResponse {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>);
}
