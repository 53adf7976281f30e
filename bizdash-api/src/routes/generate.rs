//! Marketing content generation endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use bizdash_services::GenerateRequest;
use serde::Serialize;

use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
struct GenerateResponse {
    content: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/marketing/generate", post(generate_content))
}

async fn generate_content(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Generate(rejection.body_text()))?;

    let cancel = state.shutdown.child_token();
    let content = state
        .content_service
        .generate(&request, &cancel)
        .await
        .map_err(|e| ApiError::Generate(e.to_string()))?;

    Ok(Json(GenerateResponse { content }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use bizdash_research::StreamLimits;
    use bizdash_services::ResearchService;

    use crate::routes::test_support::{app, send};

    fn research() -> ResearchService {
        ResearchService::with_providers(None, None, StreamLimits::default())
    }

    #[tokio::test]
    async fn test_generates_email() {
        let body = r#"{
            "topic": "Loyalty Cards",
            "tone": "warm",
            "format": "email",
            "businessContext": {"businessName": "Test Coffee Shop", "niche": "Coffee", "ownerName": "Dana"}
        }"#;

        let (status, json) = send(app(research()), Method::POST, "/api/marketing/generate", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        let content = json["content"].as_str().unwrap();
        assert!(content.starts_with("Subject: Let's talk about Loyalty Cards"));
        assert!(content.ends_with("Best,\nDana"));
    }

    #[tokio::test]
    async fn test_invalid_body_is_generic_failure() {
        let (status, json) = send(
            app(research()),
            Method::POST,
            "/api/marketing/generate",
            Some(r#"{"topic": "x"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({"error": "Failed to generate content"}));
    }
}
