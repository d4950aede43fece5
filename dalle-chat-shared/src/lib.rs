pub mod intent;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use intent::{extract_image_prompt, Intent};

/// Path the relay is mounted on.
pub const RELAY_PATH: &str = "/dalle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            image_url: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            image_url: None,
        }
    }

    pub fn image(caption: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: caption.into(),
            image_url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Body of `POST /dalle`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "falsy_as_none"
    )]
    pub message: Option<String>,
}

/// `null`, `false`, `0` and `""` all mean "no message"; any other non-string
/// value is malformed.
fn falsy_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) if !text.is_empty() => Ok(Some(text)),
        Value::String(_) | Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        other => Err(de::Error::custom(format!(
            "message must be a string, got {}",
            other
        ))),
    }
}

impl RelayRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Parses a raw request body. An empty body counts as `{}`.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body)
    }

    /// The message, if present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// JSON body returned with every 500.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        let request = RelayRequest::parse("").unwrap();
        assert!(request.message().is_none());
    }

    #[test]
    fn empty_message_counts_as_missing() {
        let request = RelayRequest::parse(r#"{"message":""}"#).unwrap();
        assert!(request.message().is_none());

        let request = RelayRequest::parse(r#"{"message":null}"#).unwrap();
        assert!(request.message().is_none());
    }

    #[test]
    fn falsy_message_counts_as_missing() {
        for body in [r#"{"message":0}"#, r#"{"message":false}"#, r#"{"message":0.0}"#] {
            let request = RelayRequest::parse(body).unwrap();
            assert!(request.message().is_none(), "{body}");
        }
    }

    #[test]
    fn non_string_message_is_rejected() {
        assert!(RelayRequest::parse(r#"{"message":42}"#).is_err());
        assert!(RelayRequest::parse(r#"{"message":true}"#).is_err());
        assert!(RelayRequest::parse(r#"{"message":["hi"]}"#).is_err());
        assert!(RelayRequest::parse("not json").is_err());
    }

    #[test]
    fn image_message_uses_camel_case_url() {
        let msg = ChatMessage::image("caption", "https://example.com/img.png");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["imageUrl"], "https://example.com/img.png");

        let plain = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert!(plain.get("imageUrl").is_none());
    }
}
