//! Business profile and marketing configuration types
//!
//! These mirror the JSON the dashboard frontend posts, so field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Postal address of a business. Only the city is used by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub city: Option<String>,
}

/// The business a research request is about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub business_name: String,
    pub niche: String,
    pub category: String,
    #[serde(default)]
    pub address: Option<Address>,
}

impl BusinessProfile {
    /// City of the business, if one was supplied and is non-blank
    pub fn city(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|a| a.city.as_deref())
            .and_then(non_blank)
    }
}

/// Marketing setup chosen by the business owner
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketingConfig {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub channels: Option<Vec<String>>,
}

impl MarketingConfig {
    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref().and_then(non_blank)
    }

    pub fn budget(&self) -> Option<&str> {
        self.budget.as_deref().and_then(non_blank)
    }

    /// Channels joined with `", "`, or `None` when the list is absent or empty
    pub fn channels_joined(&self) -> Option<String> {
        match &self.channels {
            Some(channels) if !channels.is_empty() => Some(channels.join(", ")),
            _ => None,
        }
    }
}

/// Business details passed along with a content generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContext {
    pub business_name: String,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
}

fn non_blank(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
