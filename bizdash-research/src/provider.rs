//! Capability traits for the two language model providers
//!
//! The pipeline only depends on these traits, so the concrete HTTP clients in
//! [`crate::providers`] can be swapped for fakes in tests.

use async_trait::async_trait;
use bizdash_core::DashboardResult;
use futures::stream::BoxStream;

/// Incremental text fragments delivered by a streaming completion, in arrival order
pub type FragmentStream = BoxStream<'static, DashboardResult<String>>;

/// A completion provider that streams plain text
#[async_trait]
pub trait StreamingCompleter: Send + Sync {
    /// Open a streaming completion for the given system and user prompts.
    ///
    /// Errors establishing the stream are returned directly; errors while
    /// reading it surface as items of the stream.
    async fn complete_streaming(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> DashboardResult<FragmentStream>;
}

/// A completion provider constrained to emit a JSON document
#[async_trait]
pub trait JsonCompleter: Send + Sync {
    /// Run one atomic completion and return the raw JSON text the model produced
    async fn complete_json(&self, prompt: &str) -> DashboardResult<String>;

    /// Short provider name for logs and health output
    fn name(&self) -> &'static str;
}
