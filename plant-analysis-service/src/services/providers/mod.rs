//! Vision model providers.
//!
//! The analysis handler talks to a [`VisionProvider`]; Gemini is the real
//! backend and the mock stands in for it in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// An image sent inline with the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Declared MIME type of the upload, passed through untouched.
    pub mime_type: String,

    /// Standard base64 of the original bytes.
    pub data: String,
}

/// Result of a provider call.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Text of the first part of the first candidate, if the model produced any.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Raw finish reason reported for the first candidate.
    pub finish_reason: Option<String>,
}

/// A generative model that can describe an image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send `prompt` together with `image` and return the model's answer.
    ///
    /// A successful call may still carry no text; callers decide what that means.
    async fn analyze(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> Result<ProviderResponse, ProviderError>;
}
