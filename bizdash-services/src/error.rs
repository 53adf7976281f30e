//! Errors surfaced by the research pipeline to HTTP callers

use thiserror::Error;

pub const MISSING_KEYS_MESSAGE: &str = "Server configuration error: Missing API Keys";
pub const RESEARCH_FAILED_MESSAGE: &str = "Failed to complete research";

/// Failure of a research request, as reported to the client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Required credentials are missing; no provider was contacted
    #[error("{message}")]
    Configuration { message: String },

    /// Something failed while the request was being served
    #[error("{message}")]
    Runtime {
        message: String,
        details: Option<String>,
    },
}

impl PipelineError {
    pub fn missing_keys() -> Self {
        PipelineError::Configuration {
            message: MISSING_KEYS_MESSAGE.to_string(),
        }
    }

    /// Generic research failure carrying the underlying error text
    pub fn research_failed(details: impl Into<String>) -> Self {
        PipelineError::Runtime {
            message: RESEARCH_FAILED_MESSAGE.to_string(),
            details: Some(details.into()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PipelineError::Configuration { message } => message,
            PipelineError::Runtime { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            PipelineError::Configuration { .. } => None,
            PipelineError::Runtime { details, .. } => details.as_deref(),
        }
    }
}
