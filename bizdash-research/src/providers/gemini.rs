use async_trait::async_trait;
use bizdash_core::{DashboardError, DashboardResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::provider::JsonCompleter;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const JSON_MIME_TYPE: &str = "application/json";

/// Gemini `generateContent` client that forces a JSON-typed response
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> DashboardResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DashboardError::network(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_string(),
            },
        }
    }
}

#[async_trait]
impl JsonCompleter for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete_json(&self, prompt: &str) -> DashboardResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::api(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::parse(format!("Failed to parse Gemini response: {}", e)))?;

        let text = body
            .text()
            .ok_or_else(|| DashboardError::parse("No text in Gemini response"))?;

        debug!(chars = text.len(), "Gemini returned JSON payload");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_forces_json() {
        let client = GeminiClient::new("key").unwrap();
        let body = serde_json::to_value(client.build_request("extract this")).unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "extract this");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "{\"summary\":"}, {"text": " \"x\"}"}]}, "finishReason": "STOP"}
            ],
            "usageMetadata": {"promptTokenCount": 10}
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some(r#"{"summary": "x"}"#));
    }

    #[test]
    fn test_response_without_text() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(blocked.text(), None);

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), None);
    }
}
