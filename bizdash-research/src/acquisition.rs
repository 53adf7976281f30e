//! Stage one: acquire raw market research text
//!
//! Either a deterministic simulated narrative (no network, never fails) or a
//! streaming completion from the web-search model, accumulated into one string.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bizdash_core::{BusinessProfile, DashboardError, DashboardResult, MarketingConfig};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::provider::{FragmentStream, StreamingCompleter};

pub const DEFAULT_CITY: &str = "the region";
pub const DEFAULT_GOAL: &str = "Deep Market Analysis";
pub const DEFAULT_BUDGET: &str = "Not specified";
pub const DEFAULT_CHANNELS: &str = "None specified";

/// Upper bound on accumulated research text (1 MiB)
pub const DEFAULT_MAX_RESEARCH_BYTES: usize = 1024 * 1024;
pub const DEFAULT_RESEARCH_TIMEOUT_SECS: u64 = 300;

const RESEARCH_SYSTEM_PROMPT: &str = r#"You are a world-class marketing researcher.
Conduct a thorough deep-dive analysis based on the user's business details.
Focus on finding REAL, current competitors and ACTUAL market trends from the live web.

Provide a comprehensive, detailed report covering:
1. Executive Summary
2. Detailed Competitor Analysis (Strengths/Weaknesses)
3. Key Market Trends
4. Strategic Recommendations

Do NOT output JSON. Just provide high-quality, dense information in plain text."#;

/// Bounds applied while draining a research stream
#[derive(Debug, Clone, Copy)]
pub struct StreamLimits {
    /// Text beyond this many bytes is dropped and the stream abandoned
    pub max_bytes: usize,
    /// Wall-clock budget for draining the stream
    pub timeout: Duration,
}

impl Default for StreamLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_RESEARCH_BYTES,
            timeout: Duration::from_secs(DEFAULT_RESEARCH_TIMEOUT_SECS),
        }
    }
}

/// Deterministic stand-in for live research, used to skip provider cost
pub fn simulated_research(profile: &BusinessProfile) -> String {
    let city = profile.city().unwrap_or(DEFAULT_CITY);

    format!(
        r#"[SIMULATED RESEARCH OUTPUT FOR TESTING]

Executive Summary:
The market for specific {niche} in {city} is growing steadily. Key opportunities exist in digital channels.

Competitors:
1. Big Corp Inc: Strong brand presence but slow customer service.
2. Local Hero Ltd: Great local loyalty but poor online website.
3. Budget Options LLC: Very cheap prices but low quality products.

Trends:
- Increasing demand for eco-friendly options.
- Shift towards mobile-first shopping experiences.
- Rise of subscription models in this sector.

Strategy:
- Focus on Instagram reels to capture younger audience.
- Launch a "Green" product line to address eco-trends.
- Improve website load speed for mobile users.
- Partner with local influencers for authenticity.
"#,
        niche = profile.niche,
        city = city,
    )
}

pub fn research_system_prompt() -> &'static str {
    RESEARCH_SYSTEM_PROMPT
}

pub fn research_user_prompt(profile: &BusinessProfile, config: &MarketingConfig) -> String {
    let channels = config
        .channels_joined()
        .unwrap_or_else(|| DEFAULT_CHANNELS.to_string());

    format!(
        r#"Business Name: {}
Niche/Category: {} ({})
Marketing Goal: {}
Target Audience: People interested in {}
Budget: {}
Channels: {}

Conduct deep research now."#,
        profile.business_name,
        profile.niche,
        profile.category,
        config.goal().unwrap_or(DEFAULT_GOAL),
        profile.niche,
        config.budget().unwrap_or(DEFAULT_BUDGET),
        channels,
    )
}

/// Drain a fragment stream into one string, in arrival order.
///
/// Stops early (keeping what was collected) once `max_bytes` is reached.
/// Fails if the stream yields an error, runs past `timeout`, or `cancel` fires.
pub async fn collect_fragments(
    stream: FragmentStream,
    limits: &StreamLimits,
    cancel: &CancellationToken,
) -> DashboardResult<String> {
    within_limits(drain_fragments(stream, limits.max_bytes), limits, cancel).await
}

async fn drain_fragments(mut stream: FragmentStream, max_bytes: usize) -> DashboardResult<String> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        let remaining = max_bytes.saturating_sub(text.len());
        if fragment.len() > remaining {
            let mut cut = remaining;
            while !fragment.is_char_boundary(cut) {
                cut -= 1;
            }
            text.push_str(&fragment[..cut]);
            warn!(max_bytes, "Research stream exceeded size limit, truncating");
            break;
        }
        text.push_str(&fragment);
    }
    Ok(text)
}

/// Run `work` under the stream deadline, giving up early if `cancel` fires
async fn within_limits<F>(
    work: F,
    limits: &StreamLimits,
    cancel: &CancellationToken,
) -> DashboardResult<String>
where
    F: Future<Output = DashboardResult<String>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DashboardError::cancelled("research stream cancelled")),
        result = tokio::time::timeout(limits.timeout, work) => match result {
            Ok(collected) => collected,
            Err(_) => Err(DashboardError::timeout(limits.timeout.as_secs(), "research stream")),
        },
    }
}

/// Runs stage one against an optional live research provider
#[derive(Clone)]
pub struct ResearchAcquirer {
    provider: Option<Arc<dyn StreamingCompleter>>,
    limits: StreamLimits,
}

impl ResearchAcquirer {
    pub fn new(provider: Option<Arc<dyn StreamingCompleter>>, limits: StreamLimits) -> Self {
        Self { provider, limits }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Produce raw research text for a business.
    ///
    /// Provider errors are not handled here; they propagate to the caller.
    #[instrument(skip_all, fields(business = %profile.business_name, simulate = simulate))]
    pub async fn acquire(
        &self,
        profile: &BusinessProfile,
        config: &MarketingConfig,
        simulate: bool,
        cancel: &CancellationToken,
    ) -> DashboardResult<String> {
        if simulate {
            info!("[Research] SIMULATION MODE: Skipping live research API cost.");
            return Ok(simulated_research(profile));
        }

        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| DashboardError::config("No research provider configured"))?;

        info!("[Research] Starting deep research for: {}", profile.business_name);

        let user_prompt = research_user_prompt(profile, config);
        // Opening the stream counts against the same deadline as draining it
        let research = async {
            let stream = provider
                .complete_streaming(research_system_prompt(), &user_prompt)
                .await?;
            drain_fragments(stream, self.limits.max_bytes).await
        };
        let text = within_limits(research, &self.limits, cancel).await?;

        info!("[Research] Live research completed. Length: {} chars.", text.chars().count());
        Ok(text)
    }
}
