use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relaychat_ai::AiError;
use relaychat_contracts::ErrorBody;

/// Failure reported before any stream bytes are committed.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<AiError> for ApiError {
    fn from(error: AiError) -> Self {
        match error {
            AiError::Configuration(message) => ApiError::internal(message),
            AiError::Upstream { status, .. } => ApiError::internal(format!(
                "Upstream request failed with status {}",
                status
            )),
            AiError::Transport(_) | AiError::Http(_) => {
                ApiError::internal("Failed to reach upstream provider")
            }
            AiError::Json(_) => ApiError::internal("Internal Server Error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}
