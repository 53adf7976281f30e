//! Business logic services for the marketing dashboard
//!
//! This crate wires the research stages into a request-level pipeline and
//! hosts the content generator used by the dashboard's writing tools.

pub mod config;
pub mod content_service;
pub mod error;
pub mod research_service;

pub use config::{generate_delay_from_env, ConfigError, ExtractionBackend, ResearchConfig};
pub use content_service::{ContentError, ContentService, GenerateRequest};
pub use error::PipelineError;
pub use research_service::{PipelineStage, ResearchRequest, ResearchService, ResearchStatus};
