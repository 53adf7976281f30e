//! Marketing content generation
//!
//! Fills fixed templates after a configurable delay. No model is called.

use std::time::Duration;

use bizdash_core::BusinessContext;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Body of a content generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub topic: String,
    pub tone: String,
    pub format: String,
    pub business_context: BusinessContext,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content generation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentFormat {
    SocialPost,
    Email,
    Other,
}

impl ContentFormat {
    fn parse(format: &str) -> Self {
        match format {
            "social_post" => ContentFormat::SocialPost,
            "email" => ContentFormat::Email,
            _ => ContentFormat::Other,
        }
    }
}

pub struct ContentService {
    delay: Duration,
}

impl ContentService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Wait out the generation delay, then render the template
    #[instrument(skip_all, fields(format = %request.format, tone = %request.tone))]
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ContentError> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ContentError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }

        let content = render_content(request);
        info!(chars = content.len(), "Generated content");
        Ok(content)
    }
}

pub fn render_content(request: &GenerateRequest) -> String {
    let business = &request.business_context;
    let name = &business.business_name;
    let niche = business.niche.as_deref().unwrap_or_default();
    let topic = &request.topic;

    let intro = format!(
        "Here is a {} {} about {} for {}:",
        request.tone, request.format, topic, name
    );

    let content = match ContentFormat::parse(&request.format) {
        ContentFormat::SocialPost => {
            let topic_tag: String = topic.split_whitespace().collect();
            format!(
                "{intro}\n\n🚀 Exciting news from {name}! \n\n\
                 We are talking about {topic} today. It's a game changer for the {niche} industry.\n\n\
                 Key takeaways:\n\
                 • Point 1 about {topic}\n\
                 • Point 2 for better results\n\
                 • Point 3 to get started\n\n\
                 #{niche} #Growth #{topic_tag}"
            )
        }
        ContentFormat::Email => {
            let owner = business.owner_name.as_deref().unwrap_or_default();
            format!(
                "Subject: Let's talk about {topic}\n\n\
                 Hi [Name],\n\n\
                 {intro}\n\n\
                 At {name}, we believe in staying ahead. That's why we're focusing on {topic} to help you succeed.\n\n\
                 Did you know that... [AI Generated Insight]\n\n\
                 Ready to learn more? Reply to this email!\n\n\
                 Best,\n{owner}"
            )
        }
        ContentFormat::Other => format!(
            "{intro}\n\n[Content for {topic} goes here...]\n\n\
             Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua."
        ),
    };

    if request.tone == "banana" {
        format!("🍌 BANANA MODE ACTIVATED 🍌\n\n{content}\n\nStay yellow and mellow! 🍌")
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tone: &str, format: &str) -> GenerateRequest {
        GenerateRequest {
            topic: "Summer Sale".to_string(),
            tone: tone.to_string(),
            format: format.to_string(),
            business_context: BusinessContext {
                business_name: "Test Coffee Shop".to_string(),
                niche: Some("Coffee".to_string()),
                owner_name: Some("Dana".to_string()),
            },
        }
    }

    #[test]
    fn test_social_post() {
        let content = render_content(&request("friendly", "social_post"));

        assert!(content.starts_with(
            "Here is a friendly social_post about Summer Sale for Test Coffee Shop:\n\n"
        ));
        assert!(content.contains("game changer for the Coffee industry."));
        assert!(content.contains("• Point 3 to get started"));
        assert!(content.ends_with("#Coffee #Growth #SummerSale"));
    }

    #[test]
    fn test_email() {
        let content = render_content(&request("professional", "email"));

        assert!(content.starts_with("Subject: Let's talk about Summer Sale\n\nHi [Name],\n\n"));
        assert!(content.contains("At Test Coffee Shop, we believe in staying ahead."));
        assert!(content.ends_with("Best,\nDana"));
    }

    #[test]
    fn test_other_format() {
        let content = render_content(&request("casual", "blog"));

        assert!(content.starts_with("Here is a casual blog about Summer Sale"));
        assert!(content.contains("[Content for Summer Sale goes here...]"));
        assert!(content.ends_with("dolore magna aliqua."));
    }

    #[test]
    fn test_banana_tone_wraps_content() {
        let content = render_content(&request("banana", "social_post"));

        assert!(content.starts_with("🍌 BANANA MODE ACTIVATED 🍌\n\nHere is a banana social_post"));
        assert!(content.ends_with("#SummerSale\n\nStay yellow and mellow! 🍌"));
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "topic": "Launch",
            "tone": "fun",
            "format": "email",
            "businessContext": {"businessName": "Shop", "ownerName": "Sam"}
        }"#;
        let request: GenerateRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.business_context.owner_name.as_deref(), Some("Sam"));
        assert!(request.business_context.niche.is_none());
    }

    #[tokio::test]
    async fn test_generate_waits_for_delay() {
        let service = ContentService::new(Duration::from_millis(20));
        let started = std::time::Instant::now();

        let content = service
            .generate(&request("friendly", "blog"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(content.contains("Summer Sale"));
    }

    #[tokio::test]
    async fn test_generate_cancelled() {
        let service = ContentService::new(Duration::from_secs(60));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = service.generate(&request("friendly", "blog"), &cancel).await;
        assert!(matches!(result, Err(ContentError::Cancelled)));
    }
}
