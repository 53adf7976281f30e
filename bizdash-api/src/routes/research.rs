//! Marketing research endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use bizdash_research::ResearchReport;
use bizdash_services::{PipelineError, ResearchRequest};
use tracing::{error, info};

use crate::{error::ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/marketing/research", post(run_research))
}

/// Run the research pipeline and return the structured report
async fn run_research(
    State(state): State<AppState>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        let details = rejection.body_text();
        error!("Research API Error: {}", details);
        PipelineError::research_failed(details)
    })?;

    info!(
        "Research requested for {} (simulate: {})",
        request.business_profile.business_name, request.simulate_perplexity
    );

    // Dropped with the request if the client goes away; cancelled on shutdown
    let cancel = state.shutdown.child_token();
    let report = state.research_service.run(&request, &cancel).await?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::{Method, StatusCode};
    use bizdash_core::{DashboardError, DashboardResult};
    use bizdash_research::{report::FALLBACK_SUMMARY, JsonCompleter, StreamLimits};
    use bizdash_services::ResearchService;

    use crate::routes::test_support::{app, send};

    struct FixedJson(&'static str);

    #[async_trait]
    impl JsonCompleter for FixedJson {
        async fn complete_json(&self, _prompt: &str) -> DashboardResult<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct Unavailable;

    #[async_trait]
    impl JsonCompleter for Unavailable {
        async fn complete_json(&self, _prompt: &str) -> DashboardResult<String> {
            Err(DashboardError::api("Gemini API error (503): overloaded"))
        }

        fn name(&self) -> &'static str {
            "unavailable"
        }
    }

    const SIMULATED_REQUEST: &str = r#"{
        "businessProfile": {
            "businessName": "Test Coffee Shop",
            "niche": "Coffee",
            "category": "Food",
            "address": {"city": "Seattle"}
        },
        "marketingConfig": {"goal": "Increase Awareness", "budget": "$5000", "channels": ["Social Media"]},
        "simulatePerplexity": true
    }"#;

    fn with_extractor(extractor: Arc<dyn JsonCompleter>) -> ResearchService {
        ResearchService::with_providers(None, Some(extractor), StreamLimits::default())
    }

    #[tokio::test]
    async fn test_simulated_research_returns_report() {
        let service = with_extractor(Arc::new(FixedJson(
            r#"{"summary": "Strong demand.", "competitors": [], "trends": ["Cold brew"], "strategy": ["Reels"]}"#,
        )));

        let (status, body) = send(
            app(service),
            Method::POST,
            "/api/marketing/research",
            Some(SIMULATED_REQUEST),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Strong demand.");
        assert_eq!(body["trends"][0], "Cold brew");
        assert_eq!(body["competitors"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_extraction_outage_still_returns_report() {
        let (status, body) = send(
            app(with_extractor(Arc::new(Unavailable))),
            Method::POST,
            "/api/marketing/research",
            Some(SIMULATED_REQUEST),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], FALLBACK_SUMMARY);
        let raw = body["strategy"][0].as_str().unwrap();
        assert!(raw.contains("Coffee in Seattle"));
    }

    #[tokio::test]
    async fn test_missing_keys_is_500_without_details() {
        let service = ResearchService::with_providers(None, None, StreamLimits::default());

        let (status, body) = send(
            app(service),
            Method::POST,
            "/api/marketing/research",
            Some(SIMULATED_REQUEST),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"error": "Server configuration error: Missing API Keys"})
        );
    }

    #[tokio::test]
    async fn test_live_research_without_key_is_rejected() {
        let service = with_extractor(Arc::new(FixedJson("{}")));
        let request = SIMULATED_REQUEST.replace("true", "false");

        let (status, body) = send(
            app(service),
            Method::POST,
            "/api/marketing/research",
            Some(&request),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server configuration error: Missing API Keys");
    }

    #[tokio::test]
    async fn test_malformed_body_is_runtime_failure() {
        let service = with_extractor(Arc::new(FixedJson("{}")));

        let (status, body) = send(
            app(service),
            Method::POST,
            "/api/marketing/research",
            Some(r#"{"businessProfile": "#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to complete research");
        assert!(body["details"].is_string());
    }
}
