//! Concrete HTTP clients for the research and extraction models

pub mod gemini;
pub mod openai;
pub mod perplexity;

pub use gemini::GeminiClient;
pub use openai::OpenAIJsonClient;
pub use perplexity::PerplexityClient;
