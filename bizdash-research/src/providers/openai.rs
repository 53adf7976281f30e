use async_openai::{
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use bizdash_core::{DashboardError, DashboardResult};
use tracing::{debug, instrument};

use crate::provider::JsonCompleter;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI chat client running in JSON-object mode, an alternative extraction backend
#[derive(Debug, Clone)]
pub struct OpenAIJsonClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIJsonClient {
    pub fn new(api_key: impl Into<String>) -> DashboardResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DashboardError::network(format!("Failed to create HTTP client: {}", e))
            })?;

        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl JsonCompleter for OpenAIJsonClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete_json(&self, prompt: &str) -> DashboardResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| DashboardError::internal(e.to_string()))?
                .into()])
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.2)
            .build()
            .map_err(|e| DashboardError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DashboardError::api(format!("OpenAI API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| DashboardError::parse("No response from OpenAI"))?;

        debug!(chars = content.len(), "OpenAI returned JSON payload");
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
