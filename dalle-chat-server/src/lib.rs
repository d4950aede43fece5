pub mod config;
pub mod error;
pub mod llm;
pub mod relay;

use axum::{
    body::Bytes,
    routing::{get, post},
    Router,
};
use dalle_chat_shared::RELAY_PATH;
use llm::GenerativeApi;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::RelayConfig;
pub use error::RelayError;
pub use llm::LlmService;

pub fn build_router(api: Arc<dyn GenerativeApi>) -> Router {
    Router::new()
        .route("/health", get(relay::health))
        .route(
            RELAY_PATH,
            post(move |body: Bytes| relay::relay(body, api)),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
