use async_openai::error::OpenAIError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dalle_chat_shared::ErrorBody;
use thiserror::Error;
use tracing::error;

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("message is required")]
    MissingMessage,

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("upstream API error: {0}")]
    Upstream(#[from] OpenAIError),

    #[error("upstream returned no image URL")]
    MissingImageUrl,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MissingMessage => {
                (StatusCode::BAD_REQUEST, MESSAGE_REQUIRED).into_response()
            }
            other => {
                error!("Relay request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: INTERNAL_SERVER_ERROR.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
