use dalle_chat_server::{build_router, LlmService, RelayConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    info!("Using OpenAI chat model: {}", config.chat_model);

    let llm_service = Arc::new(LlmService::new(
        config.api_key,
        config.chat_model,
        config.image_model,
    ));
    let app = build_router(llm_service);

    info!("Relay listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
