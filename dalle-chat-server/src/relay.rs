use crate::error::RelayError;
use crate::llm::GenerativeApi;
use axum::{
    body::{Body, Bytes},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use dalle_chat_shared::{extract_image_prompt, Intent, RelayRequest};
use futures_util::TryStreamExt;
use std::sync::Arc;
use tracing::info;

/// `POST /dalle`: routes one message to image generation or a chat stream.
/// The body is decoded lossily, so stray invalid bytes never reject a request.
pub async fn relay(body: Bytes, api: Arc<dyn GenerativeApi>) -> Result<Response, RelayError> {
    let body = String::from_utf8_lossy(&body);
    let request = RelayRequest::parse(&body)?;
    let message = request.message().ok_or(RelayError::MissingMessage)?;

    match Intent::classify(message) {
        Intent::Image => {
            let prompt = extract_image_prompt(message);
            info!("Image request, prompt: {:?}", prompt);
            let url = api.generate_image(&prompt).await?;
            Ok(Json(url).into_response())
        }
        Intent::Chat => {
            info!("Chat request ({} chars)", message.len());
            let stream = api.stream_chat(message).await?;
            let body = Body::from_stream(stream.map_ok(Bytes::from));
            Ok(([(CONTENT_TYPE, "text/plain")], body).into_response())
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}
