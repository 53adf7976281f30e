use std::collections::VecDeque;

use async_trait::async_trait;
use bizdash_core::{DashboardError, DashboardResult};
use bytes::Bytes;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::provider::{FragmentStream, StreamingCompleter};
use crate::sse::SseDecoder;

const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar-pro";
const DEFAULT_SEARCH_TYPE: &str = "pro";
const STREAM_DONE: &str = "[DONE]";

/// Streaming chat client for Perplexity's web-search-augmented models
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    search_type: String,
}

#[derive(Debug, Serialize)]
pub struct PerplexityChatRequest {
    pub model: String,
    pub messages: Vec<PerplexityMessage>,
    pub stream: bool,
    pub web_search_options: WebSearchOptions,
}

#[derive(Debug, Serialize)]
pub struct PerplexityMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct WebSearchOptions {
    pub search_type: String, // "fast", "pro", "auto"
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl PerplexityClient {
    /// Create a client for the given API key.
    ///
    /// Only a connect timeout is set here: a research stream can legitimately
    /// run for minutes, and the total duration is bounded by the caller.
    pub fn new(api_key: impl Into<String>) -> DashboardResult<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DashboardError::network(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: PERPLEXITY_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            search_type: DEFAULT_SEARCH_TYPE.to_string(),
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

    fn build_request(&self, system_prompt: &str, user_prompt: &str) -> PerplexityChatRequest {
        PerplexityChatRequest {
            model: self.model.clone(),
            messages: vec![
                PerplexityMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                PerplexityMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            stream: true,
            web_search_options: WebSearchOptions {
                search_type: self.search_type.clone(),
            },
        }
    }
}

#[async_trait]
impl StreamingCompleter for PerplexityClient {
    #[instrument(skip(self, system_prompt, user_prompt), fields(model = %self.model))]
    async fn complete_streaming(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> DashboardResult<FragmentStream> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(system_prompt, user_prompt);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("Perplexity API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::api(format!(
                "Perplexity API error ({}): {}",
                status, body
            )));
        }

        debug!("Perplexity stream opened");

        let bytes = response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| {
                    DashboardError::network(format!("Failed to read Perplexity stream: {}", e))
                })
            })
            .boxed();

        Ok(fragment_stream(bytes))
    }
}

struct StreamState {
    inner: BoxStream<'static, DashboardResult<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

impl StreamState {
    fn handle_events(&mut self, events: Vec<String>) {
        for data in events {
            if self.done {
                return;
            }
            if data == STREAM_DONE {
                self.done = true;
                return;
            }
            match serde_json::from_str::<ChatCompletionChunk>(&data) {
                Ok(chunk) => {
                    let piece = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.delta)
                        .and_then(|d| d.content);
                    if let Some(piece) = piece.filter(|p| !p.is_empty()) {
                        self.pending.push_back(piece);
                    }
                }
                Err(e) => {
                    let preview: String = data.chars().take(200).collect();
                    warn!(error = %e, data_preview = %preview, "Failed to parse Perplexity stream chunk");
                }
            }
        }
    }
}

/// Turn a raw SSE byte stream into the text fragments carried by each chunk's delta
pub(crate) fn fragment_stream(
    inner: BoxStream<'static, DashboardResult<Bytes>>,
) -> FragmentStream {
    let state = StreamState {
        inner,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.done {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(&chunk);
                    state.handle_events(events);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    let events = state.decoder.finish();
                    state.handle_events(events);
                    state.done = true;
                }
            }
        }
    })
    .boxed()
}
