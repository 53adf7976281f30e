//! HTTP error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bizdash_services::PipelineError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate content";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Research(#[from] PipelineError),

    /// Generation failed; the cause is logged but not returned
    #[error("Failed to generate content: {0}")]
    Generate(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::Research(e) => ErrorResponse {
                error: e.message().to_string(),
                details: e.details().map(str::to_string),
            },
            ApiError::Generate(cause) => {
                error!("Generation API Error: {}", cause);
                ErrorResponse {
                    error: GENERATE_FAILED_MESSAGE.to_string(),
                    details: None,
                }
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
