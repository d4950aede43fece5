use crate::error::RelayError;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateImageRequestArgs, Image, ImageModel, ImageQuality,
        ImageResponseFormat, ImageSize,
    },
    Client,
};
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use tracing::{debug, error, info};

/// Incremental text fragments from a streaming completion.
pub type TextStream = BoxStream<'static, Result<String, RelayError>>;

/// The two upstream calls the relay makes. Built once at startup and shared
/// read-only across requests.
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Generates exactly one image and returns its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, RelayError>;

    /// Opens a streaming completion with `message` as the only user turn.
    async fn stream_chat(&self, message: &str) -> Result<TextStream, RelayError>;
}

pub struct LlmService {
    client: Client<OpenAIConfig>,
    chat_model: String,
    image_model: String,
}

impl LlmService {
    pub fn new(api_key: String, chat_model: String, image_model: String) -> Self {
        info!(
            "Initializing LLM service with chat model {} and image model {}",
            chat_model, image_model
        );
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self {
            client,
            chat_model,
            image_model,
        }
    }

    fn image_model(&self) -> ImageModel {
        match self.image_model.as_str() {
            "dall-e-2" => ImageModel::DallE2,
            "dall-e-3" => ImageModel::DallE3,
            other => ImageModel::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl GenerativeApi for LlmService {
    async fn generate_image(&self, prompt: &str) -> Result<String, RelayError> {
        let request = CreateImageRequestArgs::default()
            .model(self.image_model())
            .prompt(prompt)
            .size(ImageSize::S1024x1024)
            .quality(ImageQuality::Standard)
            .response_format(ImageResponseFormat::Url)
            .n(1)
            .build()?;

        let response = self.client.images().create(request).await.map_err(|e| {
            error!("Failed to generate image: {:?}", e);
            RelayError::from(e)
        })?;

        match response.data.first().map(|image| image.as_ref()) {
            Some(Image::Url { url, .. }) => {
                debug!("Image generated at {}", url);
                Ok(url.clone())
            }
            _ => Err(RelayError::MissingImageUrl),
        }
    }

    async fn stream_chat(&self, message: &str) -> Result<TextStream, RelayError> {
        let user_message = ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message)
                .build()?,
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages(vec![user_message])
            .stream(true)
            .build()?;

        let stream = self.client.chat().create_stream(request).await.map_err(|e| {
            error!("Failed to create OpenAI stream: {:?}", e);
            RelayError::from(e)
        })?;

        let fragments = stream.filter_map(|result| async move {
            match result {
                Ok(response) => response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(Ok),
                Err(e) => {
                    error!("OpenAI stream error: {:?}", e);
                    Some(Err(RelayError::from(e)))
                }
            }
        });

        Ok(fragments.boxed())
    }
}
