//! Error types for the dashboard

use thiserror::Error;

/// Dashboard-wide error type
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out after {seconds}s: {context}")]
    Timeout { seconds: u64, context: String },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn api(msg: impl Into<String>) -> Self {
        DashboardError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        DashboardError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        DashboardError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DashboardError::Config(msg.into())
    }

    pub fn timeout(seconds: u64, context: impl Into<String>) -> Self {
        DashboardError::Timeout {
            seconds,
            context: context.into(),
        }
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        DashboardError::Cancelled(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DashboardError::Internal(msg.into())
    }
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DashboardError::api("quota exceeded").to_string(),
            "API error: quota exceeded"
        );
        assert_eq!(
            DashboardError::timeout(30, "research stream").to_string(),
            "Timed out after 30s: research stream"
        );
    }
}
