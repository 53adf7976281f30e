//! Stage two: turn raw research text into a JSON report candidate

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::provider::JsonCompleter;

pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

const EXTRACTION_INSTRUCTIONS: &str = r#"You are a strict JSON extraction engine.

You will be given a FULL raw marketing research report (including executive summary, competitors, trends, strategy, etc).
Read the ENTIRE report carefully and then return ONLY a JSON object in this EXACT shape:

{
  "summary": "A high-level executive summary (max 3 sentences)",
  "competitors": [
    { "name": "Name", "strength": "Key strength", "weakness": "Key weakness" }
  ],
  "trends": ["Trend 1", "Trend 2", "Trend 3"],
  "strategy": [
    "Specific actionable strategy step 1",
    "Step 2",
    "Step 3",
    "Step 4"
  ]
}

Rules:
- Always include ALL 4 top-level keys: "summary", "competitors", "trends", "strategy".
- If you can't find some section, still return the key with an empty array (e.g. "competitors": []).
- "summary" MUST be max 3 sentences and truly capture the full report, not just one section.
- "competitors" must be derived from ALL competitor info in the report (merge duplicates, be concise).
- "trends" must be the MOST important market/consumer/industry trends mentioned in the report.
- "strategy" must be concrete, actionable recommendations derived from the whole report, tailored to the business.
- Do NOT include any markdown, code fences, commentary, or extra fields. Return ONLY raw JSON."#;

/// The fixed extraction instruction with the raw report embedded verbatim
pub fn extraction_prompt(raw_text: &str) -> String {
    format!(
        "{}\n\nRaw Report:\n\"\"\"\n{}\n\"\"\"\n",
        EXTRACTION_INSTRUCTIONS, raw_text
    )
}

/// Ask the JSON provider for a structured report.
///
/// Returns `None` when the provider call fails, overruns `timeout`, or is
/// cancelled; the caller is expected to fall back to the raw text.
#[instrument(skip_all, fields(provider = provider.name(), raw_bytes = raw_text.len()))]
pub async fn extract_structured_report(
    provider: &dyn JsonCompleter,
    raw_text: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<String> {
    let prompt = extraction_prompt(raw_text);
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("[Research] Structured extraction cancelled. Falling back to raw text.");
            return None;
        }
        result = tokio::time::timeout(timeout, provider.complete_json(&prompt)) => result,
    };

    match result {
        Ok(Ok(json_text)) => {
            info!("[Research] Structured extraction complete.");
            Some(json_text)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "[Research] Structured extraction failed. Falling back to raw text.");
            None
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "[Research] Structured extraction timed out. Falling back to raw text."
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bizdash_core::{DashboardError, DashboardResult};
    use std::sync::Mutex;

    struct Recording {
        reply: DashboardResult<String>,
        seen: Mutex<Vec<String>>,
    }

    impl Recording {
        fn replying(reply: DashboardResult<String>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JsonCompleter for Recording {
        async fn complete_json(&self, prompt: &str) -> DashboardResult<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(DashboardError::api(e.to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// Accepts the prompt and never answers
    struct Unanswered;

    #[async_trait]
    impl JsonCompleter for Unanswered {
        async fn complete_json(&self, _prompt: &str) -> DashboardResult<String> {
            futures::future::pending().await
        }

        fn name(&self) -> &'static str {
            "unanswered"
        }
    }

    const LIMIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_prompt_embeds_raw_text_verbatim() {
        let raw = "Competitors:\n1. Big Corp Inc: \"quoted\" strengths";
        let prompt = extraction_prompt(raw);

        assert!(prompt.starts_with("You are a strict JSON extraction engine."));
        assert!(prompt.contains(&format!("Raw Report:\n\"\"\"\n{}\n\"\"\"", raw)));
    }

    #[test]
    fn test_prompt_states_schema_rules() {
        let prompt = extraction_prompt("");
        assert!(prompt.contains(r#"Always include ALL 4 top-level keys: "summary", "competitors", "trends", "strategy"."#));
        assert!(prompt.contains("max 3 sentences"));
        assert!(prompt.contains("merge duplicates"));
        assert!(prompt.contains("Return ONLY raw JSON."));
    }

    #[tokio::test]
    async fn test_returns_provider_text() {
        let provider = Recording::replying(Ok(r#"{"summary": "s"}"#.to_string()));

        let result =
            extract_structured_report(&provider, "raw", LIMIT, &CancellationToken::new()).await;
        assert_eq!(result.as_deref(), Some(r#"{"summary": "s"}"#));
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_none() {
        let provider = Recording::replying(Err(DashboardError::network("down")));

        let result =
            extract_structured_report(&provider, "raw", LIMIT, &CancellationToken::new()).await;
        assert_eq!(result, None);
        // Attempted exactly once
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unanswered_provider_times_out() {
        let result = extract_structured_report(
            &Unanswered,
            "raw",
            Duration::from_millis(50),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_cancel_abandons_extraction() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            extract_structured_report(&Unanswered, "raw", Duration::from_secs(60), &cancel),
        )
        .await
        .expect("cancelled extraction should return promptly");
        assert_eq!(result, None);
    }
}
