//! Marketing research pipeline stages
//!
//! Acquires raw market research text (simulated, or streamed from a
//! web-search-augmented model) and turns it into a structured
//! [`ResearchReport`] with a second, JSON-constrained model.

pub mod acquisition;
pub mod extraction;
pub mod provider;
pub mod providers;
pub mod report;
pub mod sse;

pub use acquisition::{simulated_research, ResearchAcquirer, StreamLimits};
pub use extraction::{extract_structured_report, extraction_prompt, DEFAULT_EXTRACTION_TIMEOUT_SECS};
pub use provider::{FragmentStream, JsonCompleter, StreamingCompleter};
pub use providers::{GeminiClient, OpenAIJsonClient, PerplexityClient};
pub use report::{assemble_report, Competitor, ResearchReport};
