//! Research service for marketing market analysis
//!
//! Orchestrates one research request end to end: credential gating, raw
//! research acquisition, structured extraction, and report assembly.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use bizdash_core::{BusinessProfile, DashboardResult, MarketingConfig};
use bizdash_research::{
    assemble_report, extract_structured_report, JsonCompleter, ResearchAcquirer, ResearchReport,
    StreamLimits, StreamingCompleter, DEFAULT_EXTRACTION_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, field, info, instrument, Span};

use crate::{config::ResearchConfig, error::PipelineError};

/// Body of a research request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub business_profile: BusinessProfile,
    #[serde(default)]
    pub marketing_config: Option<MarketingConfig>,
    #[serde(default)]
    pub simulate_perplexity: bool,
}

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    ValidatingConfig,
    Acquiring,
    Extracting,
    Assembling,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::ValidatingConfig => "validating_config",
            PipelineStage::Acquiring => "acquiring",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Assembling => "assembling",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Which providers the service was configured with
#[derive(Debug, Clone, Serialize)]
pub struct ResearchStatus {
    pub acquisition_configured: bool,
    pub extraction_configured: bool,
    pub extraction_backend: Option<&'static str>,
}

/// Service running the two-stage research pipeline
#[derive(Clone)]
pub struct ResearchService {
    acquirer: ResearchAcquirer,
    extractor: Option<Arc<dyn JsonCompleter>>,
    extraction_timeout: Duration,
}

impl ResearchService {
    /// Build the service from startup configuration.
    ///
    /// Providers whose key is missing are left unset; requests that need them
    /// are rejected at the gating step rather than here.
    pub fn new(config: &ResearchConfig) -> DashboardResult<Self> {
        Ok(Self::with_providers(
            config.acquisition_provider()?,
            config.extraction_provider()?,
            config.limits,
        )
        .with_extraction_timeout(config.extraction_timeout))
    }

    pub fn with_providers(
        acquisition: Option<Arc<dyn StreamingCompleter>>,
        extraction: Option<Arc<dyn JsonCompleter>>,
        limits: StreamLimits,
    ) -> Self {
        Self {
            acquirer: ResearchAcquirer::new(acquisition, limits),
            extractor: extraction,
            extraction_timeout: Duration::from_secs(DEFAULT_EXTRACTION_TIMEOUT_SECS),
        }
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    pub fn status(&self) -> ResearchStatus {
        ResearchStatus {
            acquisition_configured: self.acquirer.has_provider(),
            extraction_configured: self.extractor.is_some(),
            extraction_backend: self.extractor.as_ref().map(|e| e.name()),
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// Only missing credentials and acquisition failures are errors. Extraction
    /// problems degrade to the fallback report.
    #[instrument(
        skip_all,
        fields(
            business = %request.business_profile.business_name,
            simulate = request.simulate_perplexity,
            stage = field::Empty,
        )
    )]
    pub async fn run(
        &self,
        request: &ResearchRequest,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport, PipelineError> {
        let started = Instant::now();
        enter_stage(PipelineStage::ValidatingConfig);

        let extractor = self.gate(request.simulate_perplexity)?;

        enter_stage(PipelineStage::Acquiring);
        let default_config = MarketingConfig::default();
        let marketing_config = request.marketing_config.as_ref().unwrap_or(&default_config);
        let raw_text = self
            .acquirer
            .acquire(
                &request.business_profile,
                marketing_config,
                request.simulate_perplexity,
                cancel,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Research API Error");
                PipelineError::research_failed(e.to_string())
            })?;

        enter_stage(PipelineStage::Extracting);
        let candidate =
            extract_structured_report(&**extractor, &raw_text, self.extraction_timeout, cancel)
                .await;

        enter_stage(PipelineStage::Assembling);
        let report = assemble_report(candidate.as_deref(), &raw_text);

        enter_stage(PipelineStage::Done);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            competitors = report.competitors.len(),
            trends = report.trends.len(),
            strategy = report.strategy.len(),
            "Research completed"
        );
        Ok(report)
    }

    fn gate(&self, simulate: bool) -> Result<&Arc<dyn JsonCompleter>, PipelineError> {
        let acquisition_ready = simulate || self.acquirer.has_provider();
        match &self.extractor {
            Some(extractor) if acquisition_ready => Ok(extractor),
            _ => {
                error!(
                    acquisition_configured = self.acquirer.has_provider(),
                    extraction_configured = self.extractor.is_some(),
                    simulate,
                    "Missing API Keys"
                );
                Err(PipelineError::missing_keys())
            }
        }
    }
}

/// Record the stage on the request span so later events carry it
fn enter_stage(stage: PipelineStage) {
    Span::current().record("stage", field::display(stage));
    debug!("Pipeline stage");
}
