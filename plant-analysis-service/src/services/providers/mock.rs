//! Mock provider implementation for testing.

use super::{InlineImage, ProviderError, ProviderResponse, VisionProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A well-formed response carrying this text.
    Text(String),
    /// A successful call whose response holds no usable text.
    Empty,
    /// A failed call.
    Fail(String),
}

/// Mock vision provider that remembers the last image it was given.
pub struct MockVisionProvider {
    reply: MockReply,
    last_image: Mutex<Option<InlineImage>>,
}

impl MockVisionProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            last_image: Mutex::new(None),
        }
    }

    /// The image passed to the most recent `analyze` call.
    pub fn last_image(&self) -> Option<InlineImage> {
        self.last_image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn analyze(
        &self,
        _prompt: &str,
        image: &InlineImage,
    ) -> Result<ProviderResponse, ProviderError> {
        *self
            .last_image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(image.clone());

        match &self.reply {
            MockReply::Text(text) => Ok(ProviderResponse {
                text: Some(text.clone()),
                input_tokens: 258,
                output_tokens: text.len() as i32 / 4,
                finish_reason: Some("STOP".to_string()),
            }),
            MockReply::Empty => Ok(ProviderResponse::default()),
            MockReply::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}
