use dalle_chat_shared::RELAY_PATH;

const DEFAULT_RELAY_BASE: &str = "http://127.0.0.1:3000";

pub struct ClientConfig {
    pub relay_url: String,
}

impl ClientConfig {
    /// `RELAY_URL` from the environment or `.env`, else the local relay.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let relay_url = std::env::var("RELAY_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("{}{}", DEFAULT_RELAY_BASE, RELAY_PATH));
        Self { relay_url }
    }
}
