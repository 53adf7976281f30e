//! Service configuration loaded from environment variables
//!
//! Read once at startup and handed to the services; request handlers never
//! touch the environment.

use std::{env, fmt, str::FromStr, sync::Arc, time::Duration};

use bizdash_core::DashboardResult;
use bizdash_research::{
    acquisition::{DEFAULT_MAX_RESEARCH_BYTES, DEFAULT_RESEARCH_TIMEOUT_SECS},
    extraction::DEFAULT_EXTRACTION_TIMEOUT_SECS,
    GeminiClient, JsonCompleter, OpenAIJsonClient, PerplexityClient, StreamLimits,
    StreamingCompleter,
};
use thiserror::Error;

pub const DEFAULT_GENERATE_DELAY_MS: u64 = 1500;

/// Errors reading configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value:?} ({error})")]
    InvalidValue {
        field: String,
        value: String,
        error: String,
    },

    #[error("Unknown extraction backend: {0} (expected \"gemini\" or \"openai\")")]
    UnknownBackend(String),
}

/// Which JSON-mode provider runs the extraction stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionBackend {
    #[default]
    Gemini,
    OpenAI,
}

impl ExtractionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionBackend::Gemini => "gemini",
            ExtractionBackend::OpenAI => "openai",
        }
    }
}

impl fmt::Display for ExtractionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ExtractionBackend::Gemini),
            "openai" => Ok(ExtractionBackend::OpenAI),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Credentials and tuning for the research pipeline
#[derive(Clone)]
pub struct ResearchConfig {
    pub perplexity_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub extraction_backend: ExtractionBackend,
    pub perplexity_model: Option<String>,
    pub gemini_model: Option<String>,
    pub openai_model: Option<String>,
    pub perplexity_base_url: Option<String>,
    pub gemini_base_url: Option<String>,
    pub limits: StreamLimits,
    /// Budget for the structured extraction call
    pub extraction_timeout: Duration,
}

// Keys stay out of logs
impl fmt::Debug for ResearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchConfig")
            .field("perplexity_api_key", &self.perplexity_api_key.is_some())
            .field("gemini_api_key", &self.gemini_api_key.is_some())
            .field("openai_api_key", &self.openai_api_key.is_some())
            .field("extraction_backend", &self.extraction_backend)
            .field("perplexity_model", &self.perplexity_model)
            .field("gemini_model", &self.gemini_model)
            .field("openai_model", &self.openai_model)
            .field("limits", &self.limits)
            .field("extraction_timeout", &self.extraction_timeout)
            .finish()
    }
}

impl ResearchConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads:
    /// - PERPLEXITY_API_KEY, GEMINI_API_KEY, OPENAI_API_KEY (all optional)
    /// - EXTRACTION_BACKEND: `gemini` (default) or `openai`
    /// - PERPLEXITY_MODEL, GEMINI_MODEL, OPENAI_MODEL
    /// - PERPLEXITY_BASE_URL, GEMINI_BASE_URL
    /// - RESEARCH_TIMEOUT_SECS, RESEARCH_MAX_BYTES, EXTRACTION_TIMEOUT_SECS
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let extraction_backend = match var("EXTRACTION_BACKEND") {
            Some(value) => value.parse()?,
            None => ExtractionBackend::default(),
        };

        let timeout_secs = parse_var(&var, "RESEARCH_TIMEOUT_SECS", DEFAULT_RESEARCH_TIMEOUT_SECS)?;
        let max_bytes = parse_var(&var, "RESEARCH_MAX_BYTES", DEFAULT_MAX_RESEARCH_BYTES)?;
        let extraction_secs =
            parse_var(&var, "EXTRACTION_TIMEOUT_SECS", DEFAULT_EXTRACTION_TIMEOUT_SECS)?;

        Ok(Self {
            perplexity_api_key: var("PERPLEXITY_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            extraction_backend,
            perplexity_model: var("PERPLEXITY_MODEL"),
            gemini_model: var("GEMINI_MODEL"),
            openai_model: var("OPENAI_MODEL"),
            perplexity_base_url: var("PERPLEXITY_BASE_URL"),
            gemini_base_url: var("GEMINI_BASE_URL"),
            limits: StreamLimits {
                max_bytes,
                timeout: Duration::from_secs(timeout_secs),
            },
            extraction_timeout: Duration::from_secs(extraction_secs),
        })
    }

    /// Key for whichever backend is selected for extraction
    pub fn extraction_api_key(&self) -> Option<&str> {
        match self.extraction_backend {
            ExtractionBackend::Gemini => self.gemini_api_key.as_deref(),
            ExtractionBackend::OpenAI => self.openai_api_key.as_deref(),
        }
    }

    /// Live research client, or `None` without a Perplexity key
    pub fn acquisition_provider(&self) -> DashboardResult<Option<Arc<dyn StreamingCompleter>>> {
        let Some(api_key) = self.perplexity_api_key.as_deref() else {
            return Ok(None);
        };

        let mut client = PerplexityClient::new(api_key)?;
        if let Some(model) = &self.perplexity_model {
            client = client.with_model(model);
        }
        if let Some(base_url) = &self.perplexity_base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Some(Arc::new(client)))
    }

    /// Extraction client for the selected backend, or `None` without its key
    pub fn extraction_provider(&self) -> DashboardResult<Option<Arc<dyn JsonCompleter>>> {
        let Some(api_key) = self.extraction_api_key() else {
            return Ok(None);
        };

        let provider: Arc<dyn JsonCompleter> = match self.extraction_backend {
            ExtractionBackend::Gemini => {
                let mut client = GeminiClient::new(api_key)?;
                if let Some(model) = &self.gemini_model {
                    client = client.with_model(model);
                }
                if let Some(base_url) = &self.gemini_base_url {
                    client = client.with_base_url(base_url);
                }
                Arc::new(client)
            }
            ExtractionBackend::OpenAI => {
                let mut client = OpenAIJsonClient::new(api_key)?;
                if let Some(model) = &self.openai_model {
                    client = client.with_model(model);
                }
                Arc::new(client)
            }
        };
        Ok(Some(provider))
    }
}

/// Delay applied before returning generated content
pub fn generate_delay_from_env() -> Result<Duration, ConfigError> {
    let var = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
    let millis = parse_var(&var, "GENERATE_DELAY_MS", DEFAULT_GENERATE_DELAY_MS)?;
    Ok(Duration::from_millis(millis))
}

fn parse_var<T, F>(var: &F, field: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(field) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            error: e.to_string(),
        }),
        None => Ok(default),
    }
}
