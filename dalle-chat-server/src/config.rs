use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use tracing::{error, info};

const DEFAULT_CHAT_MODEL: &str = "gpt-4";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub chat_model: String,
    pub image_model: String,
    pub addr: SocketAddr,
}

impl RelayConfig {
    /// Reads the relay settings from the environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if key.starts_with("sk-") => {
                info!("OpenAI API key loaded successfully");
                key
            }
            Ok(_) => {
                error!("OPENAI_API_KEY found but doesn't start with 'sk-'. Please check your .env file");
                bail!("invalid OpenAI API key format");
            }
            Err(_) => {
                error!("OPENAI_API_KEY not found. Please set it in your .env file");
                bail!("OPENAI_API_KEY must be set");
            }
        };

        let chat_model = env_or("OPENAI_MODEL", DEFAULT_CHAT_MODEL);
        let image_model = env_or("OPENAI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL);
        let addr = env_or("RELAY_ADDR", DEFAULT_ADDR)
            .parse()
            .context("RELAY_ADDR is not a valid socket address")?;

        Ok(Self {
            api_key,
            chat_model,
            image_model,
            addr,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
